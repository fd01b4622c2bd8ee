//! Proptest generators for property-based testing.

use proptest::prelude::*;

use sysrole_core::{
    AccessLevel, Catalog, Direction, PendingEdits, PermissionName, Role, User, SYSTEM_ADMIN_ROLE,
};

/// Leaf section names of the built-in catalog.
pub fn builtin_leaves() -> Vec<String> {
    let catalog = Catalog::builtin();
    catalog
        .all_names()
        .into_iter()
        .filter(|name| catalog.find(name).is_some_and(|s| s.is_leaf()))
        .map(String::from)
        .collect()
}

/// Generate an AccessLevel.
pub fn access_level() -> impl Strategy<Value = AccessLevel> {
    prop_oneof![
        Just(AccessLevel::None),
        Just(AccessLevel::Read),
        Just(AccessLevel::Write),
    ]
}

/// A section short name: usually a built-in leaf, sometimes one the catalog
/// does not know.
pub fn short_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(builtin_leaves()),
        1 => "[a-z]{3,10}".prop_map(String::from),
    ]
}

/// A console permission string.
pub fn console_permission() -> impl Strategy<Value = String> {
    (any::<bool>(), short_name()).prop_map(|(write, name)| {
        if write {
            PermissionName::write(name).format()
        } else {
            PermissionName::read(name).format()
        }
    })
}

/// Any permission a stored role might hold.
pub fn permission() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => console_permission(),
        1 => prop::sample::select(vec![
            "manage_system".to_string(),
            "manage_plugins".to_string(),
            "get_logs".to_string(),
            "create_team".to_string(),
        ]),
    ]
}

pub fn role_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("custom".to_string()),
        Just(SYSTEM_ADMIN_ROLE.to_string()),
        "[a-z_]{3,12}".prop_map(String::from),
    ]
}

/// Generate a role with up to 16 permissions.
pub fn role() -> impl Strategy<Value = Role> {
    (role_name(), prop::collection::btree_set(permission(), 0..16))
        .prop_map(|(name, permissions)| Role::new(name, permissions))
}

/// Generate up to 8 pending section edits.
pub fn pending_edits() -> impl Strategy<Value = PendingEdits> {
    prop::collection::vec((short_name(), access_level()), 0..8)
        .prop_map(|edits| edits.into_iter().collect())
}

/// Generate a user from a small id space so collisions happen.
pub fn user() -> impl Strategy<Value = User> {
    (0u8..6).prop_map(|i| User::new(format!("u{i}"), "system_user"))
}

pub fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Add), Just(Direction::Remove)]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use sysrole_core::{
        aggregate_access, compile, save_needed, MembershipEdits, SectionAccess, Sentinels,
        SystemSection,
    };

    use super::*;

    fn console_for(permissions: &BTreeSet<String>, section: &str) -> BTreeSet<String> {
        permissions
            .iter()
            .filter(|p| PermissionName::parse(p).is_some_and(|n| n.short_name == section))
            .cloned()
            .collect()
    }

    proptest! {
        #[test]
        fn test_compile_closed_under_ancillary(r in role(), e in pending_edits()) {
            let catalog = Catalog::builtin();
            let compiled = compile(&r, &e, &catalog, &Sentinels::default());

            for p in &compiled {
                for implied in catalog.ancillary_of(p) {
                    prop_assert!(compiled.contains(implied), "{p} implies missing {implied}");
                }
            }
        }

        #[test]
        fn test_compile_deterministic(r in role(), e in pending_edits()) {
            let catalog = Catalog::builtin();
            let sentinels = Sentinels::default();
            prop_assert_eq!(
                compile(&r, &e, &catalog, &sentinels),
                compile(&r, &e, &catalog, &sentinels)
            );
        }

        #[test]
        fn test_recompile_is_fixpoint(r in role(), e in pending_edits()) {
            let catalog = Catalog::builtin();
            let sentinels = Sentinels::default();
            let once = compile(&r, &e, &catalog, &sentinels);
            let twice = compile(&r.with_permissions(once.clone()), &e, &catalog, &sentinels);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_untouched_sections_preserved(
            r in role(),
            e in pending_edits(),
            section in prop::sample::select(builtin_leaves()),
        ) {
            prop_assume!(!e.contains(&section));
            let compiled = compile(&r, &e, &Catalog::builtin(), &Sentinels::default());
            prop_assert_eq!(
                console_for(&compiled, &section),
                console_for(&r.permissions, &section)
            );
        }

        #[test]
        fn test_admin_always_holds_super_permission(
            permissions in prop::collection::btree_set(permission(), 0..16),
            e in pending_edits(),
        ) {
            let admin = Role::new(SYSTEM_ADMIN_ROLE, permissions);
            let compiled = compile(&admin, &e, &Catalog::builtin(), &Sentinels::default());
            prop_assert!(compiled.contains("manage_system"));
        }

        #[test]
        fn test_add_then_remove_is_noop(u in user()) {
            let mut edits = MembershipEdits::new();
            edits.add_users([u.clone()]);
            edits.remove_user(u);
            prop_assert!(edits.is_empty());
        }

        #[test]
        fn test_membership_stays_disjoint(
            toggles in prop::collection::vec((user(), direction()), 0..32),
        ) {
            let mut edits = MembershipEdits::new();
            for (u, d) in toggles {
                edits.toggle(u, d);
            }
            for u in edits.to_add() {
                prop_assert!(!edits.is_pending_remove(&u.id));
            }
        }

        #[test]
        fn test_two_subsections_mixed_iff_levels_differ(
            a in access_level(),
            b in access_level(),
        ) {
            let section = SystemSection::with_subsections(
                "parent",
                vec![SystemSection::leaf("parent_a"), SystemSection::leaf("parent_b")],
            );
            let edits: PendingEdits = [("parent_a", a), ("parent_b", b)].into_iter().collect();
            let shown = aggregate_access(&section, &BTreeSet::new(), &edits, &Sentinels::default());

            if a == b {
                prop_assert_eq!(shown, SectionAccess::from(a));
            } else {
                prop_assert_eq!(shown, SectionAccess::Mixed);
            }
        }

        #[test]
        fn test_fresh_state_needs_no_save(r in role()) {
            prop_assert!(!save_needed(
                &r,
                &PendingEdits::new(),
                &MembershipEdits::new(),
                &Catalog::builtin(),
                &Sentinels::default(),
            ));
        }
    }
}
