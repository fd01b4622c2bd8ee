//! Store traits: the abstract interface to wherever roles and users live.
//!
//! The engine owns no lock on the store. Writes are last-writer-wins; two
//! operators editing the same role can race and that is the store's business.

use std::sync::Arc;

use async_trait::async_trait;
use sysrole_core::{Role, User, UserId};

use crate::error::Result;

/// Read and replace roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Load a role by name.
    async fn fetch_role(&self, name: &str) -> Result<Role>;

    /// Replace a role's permission set wholesale.
    ///
    /// Returns the role as the store now holds it.
    async fn replace_role_permissions(&self, role: &Role) -> Result<Role>;
}

/// Read users and rewrite their role strings.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Overwrite a user's space-separated role string.
    async fn update_user_role_tokens(&self, user_id: &UserId, roles: &str) -> Result<()>;

    /// Users currently holding `role`.
    async fn users_in_role(&self, role: &str) -> Result<Vec<User>>;
}

#[async_trait]
impl<T: RoleStore + ?Sized> RoleStore for Arc<T> {
    async fn fetch_role(&self, name: &str) -> Result<Role> {
        (**self).fetch_role(name).await
    }

    async fn replace_role_permissions(&self, role: &Role) -> Result<Role> {
        (**self).replace_role_permissions(role).await
    }
}

#[async_trait]
impl<T: UserStore + ?Sized> UserStore for Arc<T> {
    async fn update_user_role_tokens(&self, user_id: &UserId, roles: &str) -> Result<()> {
        (**self).update_user_role_tokens(user_id, roles).await
    }

    async fn users_in_role(&self, role: &str) -> Result<Vec<User>> {
        (**self).users_in_role(role).await
    }
}
