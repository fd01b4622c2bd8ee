//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use sysrole::{EditSession, EngineConfig, NoopBlocker, Result};
use sysrole_core::{Catalog, Role, User};
use sysrole_store::MemoryStore;

/// A test fixture with a seeded memory store.
///
/// Holds an empty `custom` role, the `system_admin` role, and users `u0` and
/// `u1`, of which `u0` already holds `custom`.
pub struct TestFixture {
    pub config: EngineConfig,
    pub store: Arc<MemoryStore>,
}

impl TestFixture {
    /// Fixture over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self::with_store(EngineConfig::default().with_catalog(catalog), MemoryStore::new())
    }

    /// Seed `store` and wrap it.
    pub fn with_store(config: EngineConfig, store: MemoryStore) -> Self {
        store.insert_role(Role::new("custom", Vec::<String>::new()));
        store.insert_role(Role::new(
            config.sentinels.admin_role.clone(),
            [config.sentinels.super_permission.clone()],
        ));
        for user in roster_users(2) {
            store.insert_user(user);
        }
        store.insert_user(User::new("u0", "system_user custom"));

        Self {
            config,
            store: Arc::new(store),
        }
    }

    pub fn insert_role(&self, role: Role) {
        self.store.insert_role(role);
    }

    /// Open a session on `role_name`.
    pub async fn session(&self, role_name: &str) -> Result<EditSession<MemoryStore, NoopBlocker>> {
        EditSession::load(
            self.config.clone(),
            Arc::clone(&self.store),
            NoopBlocker,
            role_name,
        )
        .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` users holding only `system_user`, named `u0`, `u1`, ...
pub fn roster_users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| User::new(format!("u{i}"), "system_user"))
        .collect()
}

#[cfg(test)]
mod tests {
    use sysrole_core::{AccessLevel, UserId};

    use super::*;

    #[tokio::test]
    async fn test_fixture_session() {
        let fixture = TestFixture::new();
        let mut session = fixture.session("custom").await.unwrap();
        assert!(!session.is_save_needed());

        session
            .apply_pending_edit(&["plugins"], AccessLevel::Write)
            .unwrap();
        session.submit().await.unwrap();

        let role = fixture.store.role("custom").unwrap();
        assert!(role.has_permission("sysconsole_write_plugins"));
        assert!(role.has_permission("manage_plugins"));
    }

    #[tokio::test]
    async fn test_fixture_roster() {
        let fixture = TestFixture::new();
        let session = fixture.session("custom").await.unwrap();
        let roster = session.roster().await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, UserId::new("u0"));
    }

    #[tokio::test]
    async fn test_fixture_admin_role() {
        let fixture = TestFixture::new();
        let session = fixture.session("system_admin").await.unwrap();
        assert!(session.is_read_only());
    }
}
