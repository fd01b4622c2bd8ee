//! Error types for the store module.

use thiserror::Error;

/// Errors a role or user store can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No role with this name.
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// No user with this id.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Write lost against a concurrent change.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store refused the write (validation, permissions).
    #[error("rejected: {0}")]
    Rejected(String),

    /// Store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
