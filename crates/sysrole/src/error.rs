//! Error types for editing sessions and commits.

use sysrole_core::{CoreError, UserId};
use sysrole_store::StoreError;
use thiserror::Error;

use crate::commit::Stage;

/// A single failed write inside a commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The store rejected the role's new permission set.
    #[error("failed to update permissions of role {role}: {source}")]
    PermissionUpdate {
        role: String,
        #[source]
        source: StoreError,
    },

    /// The store rejected a user's new role string.
    #[error("failed to update roles of user {user_id}: {source}")]
    MembershipUpdate {
        user_id: UserId,
        #[source]
        source: StoreError,
    },
}

/// The one error a commit reports.
///
/// Holds the error of the latest stage that failed. Within a fan-out stage
/// only the first failure is kept; `failed_requests` counts all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.error, .failed_requests))]
pub struct AggregatedError {
    pub stage: Stage,
    #[source]
    pub error: CommitError,
    pub failed_requests: usize,
}

impl AggregatedError {
    /// Human-readable message for display.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn summarize(error: &CommitError, failed_requests: &usize) -> String {
    match *failed_requests {
        0 | 1 => error.to_string(),
        n => format!("{error} (and {} more failed)", n - 1),
    }
}

/// Errors that can occur while editing or submitting a role.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid edit.
    #[error("edit error: {0}")]
    Core(#[from] CoreError),

    /// Store error outside a commit (loading).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Submit called with nothing to commit.
    #[error("nothing to save")]
    NothingToSave,

    /// One or more commit stages failed.
    #[error("commit failed: {0}")]
    Commit(#[from] AggregatedError),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
