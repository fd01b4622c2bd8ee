//! Compiles the permission set a role would have once pending edits commit.
//!
//! Untouched sections are carried forward verbatim. Touched sections are
//! rebuilt from their edit alone, so a stale ancillary grant from an earlier
//! edit of the same section does not survive. Every added permission brings
//! its ancillary closure with it.

use std::collections::BTreeSet;

use crate::access::{AccessLevel, PendingEdits};
use crate::catalog::Catalog;
use crate::permission::{PermissionName, Sentinels};
use crate::types::Role;

/// Compile the closed permission set for `role` with `edits` applied.
///
/// Non-console permissions in the committed set are not carried unless an
/// added permission implies them.
pub fn compile(
    role: &Role,
    edits: &PendingEdits,
    catalog: &Catalog,
    sentinels: &Sentinels,
) -> BTreeSet<String> {
    let mut out = BTreeSet::new();

    for permission in &role.permissions {
        let Some(name) = PermissionName::parse(permission) else {
            continue;
        };
        if !edits.contains(&name.short_name) {
            grant(&mut out, permission, catalog);
        }
    }

    for (short_name, level) in edits.iter() {
        match level {
            AccessLevel::Write => {
                grant(&mut out, &PermissionName::read(short_name).format(), catalog);
                grant(&mut out, &PermissionName::write(short_name).format(), catalog);
            }
            AccessLevel::Read => {
                grant(&mut out, &PermissionName::read(short_name).format(), catalog);
            }
            AccessLevel::None => {}
        }
    }

    if sentinels.is_admin_role(&role.name) {
        grant(&mut out, &sentinels.super_permission, catalog);
    }

    out
}

/// Insert `permission` and everything it transitively implies.
fn grant(out: &mut BTreeSet<String>, permission: &str, catalog: &Catalog) {
    let mut pending = vec![permission.to_string()];
    while let Some(next) = pending.pop() {
        if out.contains(&next) {
            continue;
        }
        pending.extend(
            catalog
                .ancillary_of(&next)
                .iter()
                .filter(|p| !out.contains(*p))
                .cloned(),
        );
        out.insert(next);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::catalog::SystemSection;

    fn catalog() -> Catalog {
        let ancillary = BTreeMap::from([
            (
                "sysconsole_read_environment".to_string(),
                vec!["get_analytics".to_string()],
            ),
            (
                "sysconsole_write_environment".to_string(),
                vec!["reload_config".to_string(), "test_email".to_string()],
            ),
            (
                "reload_config".to_string(),
                vec!["invalidate_caches".to_string()],
            ),
            (
                "sysconsole_read_site".to_string(),
                vec!["edit_brand".to_string()],
            ),
        ]);
        Catalog::new(
            vec![
                SystemSection::leaf("environment"),
                SystemSection::leaf("site"),
                SystemSection::leaf("about"),
            ],
            ancillary,
        )
        .unwrap()
    }

    fn set(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_write_edit_adds_pair_and_closure() {
        let role = Role::new("custom", ["sysconsole_read_environment"]);
        let edits: PendingEdits = [("environment", AccessLevel::Write)].into_iter().collect();

        let compiled = compile(&role, &edits, &catalog(), &Sentinels::default());
        assert_eq!(
            compiled,
            set(&[
                "sysconsole_read_environment",
                "sysconsole_write_environment",
                "get_analytics",
                "reload_config",
                "invalidate_caches",
                "test_email",
            ])
        );
    }

    #[test]
    fn test_read_edit_drops_write() {
        let role = Role::new(
            "custom",
            ["sysconsole_read_environment", "sysconsole_write_environment"],
        );
        let edits: PendingEdits = [("environment", AccessLevel::Read)].into_iter().collect();

        let compiled = compile(&role, &edits, &catalog(), &Sentinels::default());
        assert_eq!(compiled, set(&["sysconsole_read_environment", "get_analytics"]));
    }

    #[test]
    fn test_none_edit_revokes_section() {
        let role = Role::new("custom", ["sysconsole_read_site", "sysconsole_read_environment"]);
        let edits: PendingEdits = [("site", AccessLevel::None)].into_iter().collect();

        let compiled = compile(&role, &edits, &catalog(), &Sentinels::default());
        assert_eq!(compiled, set(&["sysconsole_read_environment", "get_analytics"]));
    }

    #[test]
    fn test_untouched_sections_carried_with_closure() {
        let role = Role::new(
            "custom",
            ["sysconsole_read_site", "sysconsole_read_future_section"],
        );
        let compiled = compile(&role, &PendingEdits::new(), &catalog(), &Sentinels::default());
        assert_eq!(
            compiled,
            set(&[
                "sysconsole_read_site",
                "edit_brand",
                "sysconsole_read_future_section",
            ])
        );
    }

    #[test]
    fn test_stale_ancillary_not_resurrected() {
        // edit_brand only came from a site grant that the edit removes.
        let role = Role::new("custom", ["sysconsole_read_site", "edit_brand"]);
        let edits: PendingEdits = [("site", AccessLevel::None)].into_iter().collect();

        let compiled = compile(&role, &edits, &catalog(), &Sentinels::default());
        assert!(compiled.is_empty());
    }

    #[test]
    fn test_admin_keeps_super_permission() {
        let role = Role::new("system_admin", Vec::<String>::new());
        let compiled = compile(&role, &PendingEdits::new(), &catalog(), &Sentinels::default());
        assert_eq!(compiled, set(&["manage_system"]));

        let edits: PendingEdits = [("environment", AccessLevel::None)].into_iter().collect();
        let role = Role::new("system_admin", ["manage_system", "sysconsole_read_environment"]);
        assert!(compile(&role, &edits, &catalog(), &Sentinels::default()).contains("manage_system"));
    }

    #[test]
    fn test_custom_sentinels() {
        let sentinels = Sentinels {
            admin_role: "root".into(),
            super_permission: "do_anything".into(),
        };
        let role = Role::new("root", Vec::<String>::new());
        let compiled = compile(&role, &PendingEdits::new(), &catalog(), &sentinels);
        assert_eq!(compiled, set(&["do_anything"]));
    }
}
