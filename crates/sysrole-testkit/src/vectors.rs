//! Scenario vectors for deterministic verification.
//!
//! Each vector is a committed role, a set of section edits, and the exact
//! permission set the built-in catalog must compile them to.

use std::collections::BTreeSet;

use serde::Serialize;
use sysrole_core::{compile, AccessLevel, Catalog, PendingEdits, Role, Sentinels};

/// A scenario vector.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub role_name: &'static str,
    /// Permissions held before the edit.
    pub committed: &'static [&'static str],
    pub edits: &'static [(&'static str, AccessLevel)],
    /// Permissions the role must hold after compiling.
    pub expected: &'static [&'static str],
}

impl ScenarioVector {
    pub fn role(&self) -> Role {
        Role::new(self.role_name, self.committed.iter().copied())
    }

    pub fn pending_edits(&self) -> PendingEdits {
        self.edits.iter().copied().collect()
    }

    pub fn expected_set(&self) -> BTreeSet<String> {
        self.expected.iter().map(|p| p.to_string()).collect()
    }

    /// Compile the vector against the built-in catalog.
    pub fn compile(&self) -> BTreeSet<String> {
        compile(
            &self.role(),
            &self.pending_edits(),
            &Catalog::builtin(),
            &Sentinels::default(),
        )
    }
}

/// Get all scenario vectors.
pub fn all_vectors() -> Vec<ScenarioVector> {
    vec![
        ScenarioVector {
            name: "write edit adds read, write, and ancillary",
            role_name: "custom",
            committed: &["sysconsole_read_environment_web_server"],
            edits: &[("environment_web_server", AccessLevel::Write)],
            expected: &[
                "sysconsole_read_environment_web_server",
                "sysconsole_write_environment_web_server",
                "test_site_url",
                "reload_config",
                "invalidate_caches",
            ],
        },
        ScenarioVector {
            name: "read downgrade drops write ancillary",
            role_name: "custom",
            committed: &[
                "sysconsole_read_environment_web_server",
                "sysconsole_write_environment_web_server",
                "test_site_url",
                "reload_config",
                "invalidate_caches",
            ],
            edits: &[("environment_web_server", AccessLevel::Read)],
            expected: &["sysconsole_read_environment_web_server"],
        },
        ScenarioVector {
            name: "none revokes only the edited section",
            role_name: "custom",
            committed: &[
                "sysconsole_read_reporting_server_logs",
                "get_logs",
                "sysconsole_read_plugins",
            ],
            edits: &[("reporting_server_logs", AccessLevel::None)],
            expected: &["sysconsole_read_plugins"],
        },
        ScenarioVector {
            name: "untouched sections carry their ancillary",
            role_name: "custom",
            committed: &[
                "sysconsole_write_plugins",
                "manage_plugins",
                "sysconsole_read_about_edition_and_license",
                "read_license_information",
            ],
            edits: &[("site_emoji", AccessLevel::Read)],
            expected: &[
                "sysconsole_write_plugins",
                "manage_plugins",
                "sysconsole_read_about_edition_and_license",
                "read_license_information",
                "sysconsole_read_site_emoji",
            ],
        },
        ScenarioVector {
            name: "unimplied non-console permission is dropped",
            role_name: "custom",
            committed: &["create_team", "sysconsole_read_plugins"],
            edits: &[("plugins", AccessLevel::Write)],
            expected: &[
                "sysconsole_read_plugins",
                "sysconsole_write_plugins",
                "manage_plugins",
            ],
        },
        ScenarioVector {
            name: "admin role keeps super permission with no edits",
            role_name: "system_admin",
            committed: &["manage_system"],
            edits: &[],
            expected: &["manage_system"],
        },
    ]
}

/// Compile every vector and compare against its expected set.
///
/// Returns `(name, matches, compiled)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, BTreeSet<String>)> {
    all_vectors()
        .iter()
        .map(|v| {
            let compiled = v.compile();
            let matches = compiled == v.expected_set();
            (v.name.to_string(), matches, compiled)
        })
        .collect()
}

/// All vectors as pretty JSON, for sharing with other implementations.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
