//! The console section catalog and the ancillary permission table.
//!
//! A [`Catalog`] is an immutable value handed to whatever needs it. The
//! built-in catalog mirrors the system console; deployments with a different
//! console can decode their own from JSON.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// One node of the console section tree.
///
/// A section without subsections is a leaf. Its name is the short name used in
/// `sysconsole_<read|write>_<name>` permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSection {
    pub name: String,

    #[serde(default)]
    pub subsections: Vec<SystemSection>,

    /// Excluded from bulk edits and from the aggregate view, still readable.
    #[serde(default)]
    pub disabled: bool,
}

impl SystemSection {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subsections: Vec::new(),
            disabled: false,
        }
    }

    pub fn with_subsections(name: impl Into<String>, subsections: Vec<SystemSection>) -> Self {
        Self {
            name: name.into(),
            subsections,
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.subsections.is_empty()
    }

    /// Subsections that take part in bulk edits and aggregation.
    pub fn enabled_subsections(&self) -> impl Iterator<Item = &SystemSection> {
        self.subsections.iter().filter(|s| !s.disabled)
    }

    fn find(&self, name: &str) -> Option<&SystemSection> {
        if self.name == name {
            return Some(self);
        }
        self.subsections.iter().find_map(|s| s.find(name))
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.name);
        for sub in &self.subsections {
            sub.collect_names(out);
        }
    }

    fn collect_edit_targets(&self, out: &mut Vec<String>) {
        if self.is_leaf() {
            out.push(self.name.clone());
            return;
        }
        for sub in self.enabled_subsections() {
            sub.collect_edit_targets(out);
        }
    }
}

/// Console sections plus the ancillary implication table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    sections: Vec<SystemSection>,

    #[serde(default)]
    ancillary: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Build a catalog from explicit parts, rejecting structural errors.
    pub fn new(
        sections: Vec<SystemSection>,
        ancillary: BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
        let catalog = Self {
            sections,
            ancillary,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Decode a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Encode to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that section names are unique across the whole tree and that the
    /// ancillary table has no empty keys.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.all_names() {
            if name.is_empty() {
                return Err(CoreError::InvalidCatalog("empty section name".into()));
            }
            if !seen.insert(name) {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate section name: {name}"
                )));
            }
        }

        if self.ancillary.keys().any(|k| k.is_empty()) {
            return Err(CoreError::InvalidCatalog(
                "empty permission in ancillary table".into(),
            ));
        }

        Ok(())
    }

    /// Top-level sections in display order.
    pub fn sections(&self) -> &[SystemSection] {
        &self.sections
    }

    /// Permissions implied by granting `permission`; empty if none.
    pub fn ancillary_of(&self, permission: &str) -> &[String] {
        self.ancillary
            .get(permission)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find a section or subsection by name.
    pub fn find(&self, name: &str) -> Option<&SystemSection> {
        self.sections.iter().find_map(|s| s.find(name))
    }

    /// Every section and subsection name, depth first.
    pub fn all_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for section in &self.sections {
            section.collect_names(&mut out);
        }
        out
    }

    /// Leaf names an edit of `name` applies to.
    ///
    /// A leaf maps to itself. A section with subsections fans out to its
    /// enabled leaves.
    pub fn edit_targets(&self, name: &str) -> Result<Vec<String>> {
        let section = self
            .find(name)
            .ok_or_else(|| CoreError::UnknownSection(name.to_string()))?;
        let mut out = Vec::new();
        section.collect_edit_targets(&mut out);
        Ok(out)
    }

    /// The built-in system console catalog.
    pub fn builtin() -> Self {
        let sections = BUILTIN_SECTIONS
            .iter()
            .map(|(name, subs)| {
                let subsections = subs
                    .iter()
                    .map(|sub| {
                        let section = SystemSection::leaf(*sub);
                        if DISABLED_SUBSECTIONS.contains(sub) {
                            section.disabled()
                        } else {
                            section
                        }
                    })
                    .collect();
                SystemSection::with_subsections(*name, subsections)
            })
            .collect();

        let ancillary = BUILTIN_ANCILLARY
            .iter()
            .map(|(perm, implied)| {
                (
                    perm.to_string(),
                    implied.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();

        Self {
            sections,
            ancillary,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_SECTIONS: &[(&str, &[&str])] = &[
    ("about", &["about_edition_and_license"]),
    (
        "reporting",
        &[
            "reporting_site_statistics",
            "reporting_team_statistics",
            "reporting_server_logs",
        ],
    ),
    (
        "user_management",
        &[
            "user_management_users",
            "user_management_groups",
            "user_management_teams",
            "user_management_channels",
            "user_management_permissions",
            "user_management_system_roles",
        ],
    ),
    (
        "environment",
        &[
            "environment_web_server",
            "environment_database",
            "environment_elasticsearch",
            "environment_file_storage",
            "environment_image_proxy",
            "environment_smtp",
            "environment_push_notification_server",
            "environment_high_availability",
            "environment_rate_limiting",
            "environment_logging",
            "environment_session_lengths",
            "environment_performance_monitoring",
            "environment_developer",
        ],
    ),
    (
        "site",
        &[
            "site_customization",
            "site_localization",
            "site_users_and_teams",
            "site_notifications",
            "site_announcement_banner",
            "site_emoji",
            "site_posts",
            "site_file_sharing_and_downloads",
            "site_public_links",
            "site_notices",
        ],
    ),
    (
        "authentication",
        &[
            "authentication_signup",
            "authentication_email",
            "authentication_password",
            "authentication_mfa",
            "authentication_ldap",
            "authentication_saml",
            "authentication_openid",
            "authentication_guest_access",
        ],
    ),
    ("plugins", &[]),
    (
        "integrations",
        &[
            "integrations_integration_management",
            "integrations_bot_accounts",
            "integrations_gif",
            "integrations_cors",
        ],
    ),
    (
        "compliance",
        &[
            "compliance_data_retention_policy",
            "compliance_compliance_export",
            "compliance_compliance_monitoring",
            "compliance_custom_terms_of_service",
        ],
    ),
    (
        "experimental",
        &[
            "experimental_features",
            "experimental_feature_flags",
            "experimental_bleve",
        ],
    ),
];

// Readable, never bulk-granted.
const DISABLED_SUBSECTIONS: &[&str] = &["user_management_system_roles"];

const BUILTIN_ANCILLARY: &[(&str, &[&str])] = &[
    (
        "sysconsole_read_about_edition_and_license",
        &["read_license_information"],
    ),
    (
        "sysconsole_write_about_edition_and_license",
        &["manage_license_information"],
    ),
    ("sysconsole_read_reporting_site_statistics", &["get_analytics"]),
    ("sysconsole_read_reporting_team_statistics", &["view_team"]),
    ("sysconsole_read_reporting_server_logs", &["get_logs"]),
    (
        "sysconsole_read_user_management_users",
        &["read_other_users_teams", "get_analytics"],
    ),
    (
        "sysconsole_write_user_management_users",
        &["edit_other_users", "demote_to_guest", "promote_guest"],
    ),
    (
        "sysconsole_read_user_management_teams",
        &["list_private_teams", "list_public_teams", "view_team"],
    ),
    (
        "sysconsole_write_user_management_teams",
        &["manage_team", "manage_team_roles", "remove_user_from_team", "join_private_teams", "join_public_teams", "add_user_to_team"],
    ),
    (
        "sysconsole_read_user_management_channels",
        &["read_public_channel", "read_channel", "read_public_channel_groups", "read_private_channel_groups"],
    ),
    (
        "sysconsole_write_user_management_channels",
        &["manage_team", "manage_public_channel_properties", "manage_private_channel_properties", "manage_private_channel_members", "manage_public_channel_members", "delete_private_channel", "delete_public_channel", "manage_channel_roles", "convert_public_channel_to_private", "convert_private_channel_to_public"],
    ),
    (
        "sysconsole_write_user_management_groups",
        &["manage_system_wide_groups"],
    ),
    (
        "sysconsole_write_environment_web_server",
        &["test_site_url", "reload_config", "invalidate_caches"],
    ),
    (
        "sysconsole_write_environment_database",
        &["recycle_database_connections"],
    ),
    (
        "sysconsole_read_environment_elasticsearch",
        &["read_elasticsearch_post_indexing_job", "read_elasticsearch_post_aggregation_job"],
    ),
    (
        "sysconsole_write_environment_elasticsearch",
        &["test_elasticsearch", "create_elasticsearch_post_indexing_job", "manage_elasticsearch_post_indexing_job", "create_elasticsearch_post_aggregation_job", "manage_elasticsearch_post_aggregation_job", "purge_elasticsearch_indexes"],
    ),
    ("sysconsole_write_environment_file_storage", &["test_s3"]),
    ("sysconsole_write_environment_smtp", &["test_email"]),
    (
        "sysconsole_write_authentication_ldap",
        &["create_ldap_sync_job", "add_ldap_public_cert", "remove_ldap_public_cert", "add_ldap_private_cert", "remove_ldap_private_cert", "test_ldap"],
    ),
    ("sysconsole_read_authentication_ldap", &["read_ldap_sync_job"]),
    (
        "sysconsole_write_authentication_saml",
        &["add_saml_public_cert", "remove_saml_public_cert", "add_saml_private_cert", "remove_saml_private_cert", "add_saml_idp_cert", "remove_saml_idp_cert"],
    ),
    (
        "sysconsole_write_authentication_email",
        &["invalidate_email_invite"],
    ),
    ("sysconsole_write_site_customization", &["edit_brand"]),
    (
        "sysconsole_read_compliance_data_retention_policy",
        &["read_data_retention_job"],
    ),
    (
        "sysconsole_write_compliance_data_retention_policy",
        &["create_data_retention_job", "manage_data_retention_job"],
    ),
    (
        "sysconsole_read_compliance_compliance_export",
        &["read_compliance_export_job", "download_compliance_export_result"],
    ),
    (
        "sysconsole_write_compliance_compliance_export",
        &["create_compliance_export_job", "manage_compliance_export_job", "download_compliance_export_result"],
    ),
    (
        "sysconsole_read_compliance_custom_terms_of_service",
        &["read_audits"],
    ),
    (
        "sysconsole_write_experimental_bleve",
        &["create_post_bleve_indexes_job", "purge_bleve_indexes"],
    ),
    (
        "sysconsole_write_plugins",
        &["manage_plugins"],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let catalog = Catalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.sections().len(), 10);
    }

    #[test]
    fn test_ancillary_of_missing_is_empty() {
        let catalog = Catalog::builtin();
        assert!(catalog.ancillary_of("sysconsole_read_plugins").is_empty());
        assert_eq!(
            catalog.ancillary_of("sysconsole_read_reporting_server_logs"),
            &["get_logs".to_string()]
        );
    }

    #[test]
    fn test_find_subsection() {
        let catalog = Catalog::builtin();
        let section = catalog.find("user_management_system_roles").unwrap();
        assert!(section.disabled);
        assert!(section.is_leaf());
        assert!(catalog.find("nope").is_none());
    }

    #[test]
    fn test_edit_targets_skip_disabled() {
        let catalog = Catalog::builtin();
        let targets = catalog.edit_targets("user_management").unwrap();
        assert_eq!(targets.len(), 5);
        assert!(!targets.contains(&"user_management_system_roles".to_string()));

        assert_eq!(catalog.edit_targets("plugins").unwrap(), vec!["plugins"]);
        assert!(matches!(
            catalog.edit_targets("missing"),
            Err(CoreError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let sections = vec![
            SystemSection::with_subsections("a", vec![SystemSection::leaf("b")]),
            SystemSection::leaf("b"),
        ];
        let err = Catalog::new(sections, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCatalog(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_flags() {
        let catalog = Catalog::builtin();
        let json = catalog.to_json().unwrap();
        let decoded = Catalog::from_json(&json).unwrap();
        assert_eq!(decoded, catalog);
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "sections": [
                {"name": "environment"},
                {"name": "site", "subsections": [{"name": "site_emoji", "disabled": true}]}
            ]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert!(catalog.find("environment").unwrap().is_leaf());
        assert!(catalog.find("site_emoji").unwrap().disabled);
        assert!(catalog.ancillary_of("sysconsole_read_environment").is_empty());
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            Catalog::from_json("{\"sections\": 3}"),
            Err(CoreError::Catalog(_))
        ));
    }
}
