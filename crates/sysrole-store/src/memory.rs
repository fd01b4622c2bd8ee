//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It records every call, can be told to fail
//! specific writes, and can add latency so concurrent requests overlap.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use sysrole_core::{Role, User, UserId};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::{RoleStore, UserStore};

/// A call the store received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchRole(String),
    ReplaceRole(String),
    UpdateUser { user_id: UserId, roles: String },
    UsersInRole(String),
}

/// In-memory role and user store.
///
/// Thread-safe via RwLock. Locks are never held across an await.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Default)]
struct MemoryStoreInner {
    roles: HashMap<String, Role>,
    users: BTreeMap<UserId, User>,

    /// Injected failure for role replacement.
    role_failure: Option<StoreError>,

    /// Injected failures per user.
    user_failures: HashMap<UserId, StoreError>,

    calls: Vec<StoreCall>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
            latency: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Delay every write by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_role(&self, role: Role) {
        self.write().roles.insert(role.name.clone(), role);
    }

    pub fn insert_user(&self, user: User) {
        self.write().users.insert(user.id.clone(), user);
    }

    pub fn role(&self, name: &str) -> Option<Role> {
        self.read().roles.get(name).cloned()
    }

    pub fn user(&self, id: &UserId) -> Option<User> {
        self.read().users.get(id).cloned()
    }

    /// Make role replacements fail with `error` until cleared.
    pub fn fail_role_update(&self, error: StoreError) {
        self.write().role_failure = Some(error);
    }

    /// Make updates of `user_id` fail with `error` until cleared.
    pub fn fail_user_update(&self, user_id: impl Into<UserId>, error: StoreError) {
        self.write().user_failures.insert(user_id.into(), error);
    }

    /// Remove every injected failure.
    pub fn clear_failures(&self) {
        let mut inner = self.write();
        inner.role_failure = None;
        inner.user_failures.clear();
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.read().calls.clone()
    }

    /// Highest number of writes that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryStoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryStoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    async fn simulate_latency(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn fetch_role(&self, name: &str) -> Result<Role> {
        let mut inner = self.write();
        inner.calls.push(StoreCall::FetchRole(name.to_string()));
        inner
            .roles
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::RoleNotFound(name.to_string()))
    }

    async fn replace_role_permissions(&self, role: &Role) -> Result<Role> {
        self.write()
            .calls
            .push(StoreCall::ReplaceRole(role.name.clone()));

        self.simulate_latency().await;

        let mut inner = self.write();
        if let Some(error) = inner.role_failure.clone() {
            debug!(role = %role.name, %error, "injected role update failure");
            return Err(error);
        }

        let stored = inner
            .roles
            .get_mut(&role.name)
            .ok_or_else(|| StoreError::RoleNotFound(role.name.clone()))?;
        stored.permissions = role.permissions.clone();
        Ok(stored.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn update_user_role_tokens(&self, user_id: &UserId, roles: &str) -> Result<()> {
        self.write().calls.push(StoreCall::UpdateUser {
            user_id: user_id.clone(),
            roles: roles.to_string(),
        });

        self.simulate_latency().await;

        let mut inner = self.write();
        if let Some(error) = inner.user_failures.get(user_id).cloned() {
            debug!(%user_id, %error, "injected user update failure");
            return Err(error);
        }

        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;
        user.roles = roles.to_string();
        Ok(())
    }

    async fn users_in_role(&self, role: &str) -> Result<Vec<User>> {
        let mut inner = self.write();
        inner.calls.push(StoreCall::UsersInRole(role.to_string()));
        Ok(inner
            .users
            .values()
            .filter(|u| u.has_role(role))
            .cloned()
            .collect())
    }
}
