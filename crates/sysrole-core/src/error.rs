//! Error types for Sysrole Core.

use thiserror::Error;

/// Errors raised by the pure role-editing primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Section name is not in the catalog.
    #[error("unknown console section: {0}")]
    UnknownSection(String),

    /// Role is exempt from permission editing.
    #[error("role {0} is protected and cannot have its permissions edited")]
    ProtectedRole(String),

    /// String is not a `sysconsole_<read|write>_<section>` permission.
    #[error("malformed console permission: {0}")]
    MalformedPermission(String),

    /// Mixed access is display-only.
    #[error("mixed access cannot be assigned to a section")]
    MixedNotAssignable,

    /// Catalog JSON could not be decoded.
    #[error("catalog decode error: {0}")]
    Catalog(#[from] serde_json::Error),

    /// Catalog decoded but is structurally invalid.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
