//! Role and user records as the backing store hands them out.
//!
//! The engine only reads these. Proposed replacements are built as new values
//! and handed back to the store.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A role with its committed, server-authoritative permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name, also the token stored in a user's role string.
    pub name: String,

    /// Fine-grained permission strings.
    pub permissions: BTreeSet<String>,
}

impl Role {
    /// Create a role from a name and any iterable of permission strings.
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether the role holds a permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Same role with its permission set replaced.
    pub fn with_permissions(&self, permissions: BTreeSet<String>) -> Self {
        Self {
            name: self.name.clone(),
            permissions,
        }
    }
}

/// A user as seen by the membership editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Space-separated role names. Treated as an unordered token list.
    pub roles: String,
}

impl User {
    pub fn new(id: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            roles: roles.into(),
        }
    }

    /// Iterate the role tokens, skipping empty fragments.
    pub fn role_tokens(&self) -> impl Iterator<Item = &str> {
        self.roles.split_whitespace()
    }

    /// Check whether the user holds a role.
    pub fn has_role(&self, role: &str) -> bool {
        self.role_tokens().any(|t| t == role)
    }

    /// Role string with `role` appended once.
    ///
    /// Existing tokens keep their order; duplicates are collapsed.
    pub fn with_role_added(&self, role: &str) -> String {
        let mut tokens: Vec<&str> = Vec::new();
        for token in self.role_tokens().chain(std::iter::once(role)) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens.join(" ")
    }

    /// Role string with every occurrence of `role` removed.
    pub fn with_role_removed(&self, role: &str) -> String {
        self.role_tokens()
            .filter(|t| *t != role)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_added_once() {
        let user = User::new("u1", "system_user");
        assert_eq!(user.with_role_added("custom"), "system_user custom");

        let already = User::new("u1", "system_user custom");
        assert_eq!(already.with_role_added("custom"), "system_user custom");
    }

    #[test]
    fn test_role_added_collapses_duplicates() {
        let user = User::new("u1", "system_user  system_user");
        assert_eq!(user.with_role_added("custom"), "system_user custom");
    }

    #[test]
    fn test_role_removed() {
        let user = User::new("u1", "system_user custom  system_guest custom");
        assert_eq!(user.with_role_removed("custom"), "system_user system_guest");
        assert!(!User::new("u1", user.with_role_removed("custom")).has_role("custom"));
    }

    #[test]
    fn test_role_removed_from_empty() {
        let user = User::new("u1", "");
        assert_eq!(user.with_role_removed("custom"), "");
        assert_eq!(user.with_role_added("custom"), "custom");
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::new("abc").to_string(), "abc");
    }
}
