//! Typed console permission names.
//!
//! Console access is granted through permission pairs of the form
//! `sysconsole_read_<section>` and `sysconsole_write_<section>`. Parsing and
//! formatting live here so no call site splits strings by hand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Permission that grants write access to every console section.
pub const MANAGE_SYSTEM: &str = "manage_system";

/// Role that always holds [`MANAGE_SYSTEM`] and cannot be edited.
pub const SYSTEM_ADMIN_ROLE: &str = "system_admin";

const PREFIX: &str = "sysconsole_";

/// Read or write half of a console permission pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    fn as_str(self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
        }
    }
}

/// A parsed `sysconsole_<kind>_<short_name>` permission.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionName {
    pub kind: AccessKind,
    pub short_name: String,
}

impl PermissionName {
    pub fn new(kind: AccessKind, short_name: impl Into<String>) -> Self {
        Self {
            kind,
            short_name: short_name.into(),
        }
    }

    pub fn read(short_name: impl Into<String>) -> Self {
        Self::new(AccessKind::Read, short_name)
    }

    pub fn write(short_name: impl Into<String>) -> Self {
        Self::new(AccessKind::Write, short_name)
    }

    /// Parse a console permission string.
    ///
    /// Returns `None` for anything that is not a console permission, including
    /// an empty section name.
    pub fn parse(permission: &str) -> Option<Self> {
        let rest = permission.strip_prefix(PREFIX)?;
        let (kind, short_name) = if let Some(s) = rest.strip_prefix("read_") {
            (AccessKind::Read, s)
        } else if let Some(s) = rest.strip_prefix("write_") {
            (AccessKind::Write, s)
        } else {
            return None;
        };

        if short_name.is_empty() {
            return None;
        }

        Some(Self::new(kind, short_name))
    }

    /// Render back to the permission string.
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}_{}", self.kind.as_str(), self.short_name)
    }
}

impl FromStr for PermissionName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::MalformedPermission(s.to_string()))
    }
}

/// The distinguished names the engine treats specially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    /// Role that always keeps `super_permission` and is never permission-edited.
    pub admin_role: String,

    /// Permission that short-circuits every section to write access.
    pub super_permission: String,
}

impl Sentinels {
    pub fn is_admin_role(&self, role_name: &str) -> bool {
        self.admin_role == role_name
    }
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            admin_role: SYSTEM_ADMIN_ROLE.to_string(),
            super_permission: MANAGE_SYSTEM.to_string(),
        }
    }
}
