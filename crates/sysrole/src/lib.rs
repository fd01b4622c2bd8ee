//! # Sysrole
//!
//! Editing engine for system console roles: which console sections a role
//! may read or write, and which users hold it.
//!
//! ## Overview
//!
//! An [`EditSession`] tracks two kinds of pending change against a role:
//!
//! - **Permission edits**: per-section access levels, compiled into a closed
//!   permission set on commit
//! - **Membership edits**: users to add to or remove from the role
//!
//! Submitting runs a staged commit: permissions, then removals, then
//! additions. Writes within a membership stage go out concurrently. A failing
//! stage does not roll back earlier ones; the session keeps whatever did not
//! become durable so the operator can retry.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sysrole::core::AccessLevel;
//! use sysrole::store::MemoryStore;
//! use sysrole::{EditSession, EngineConfig, NoopBlocker};
//!
//! async fn example() -> sysrole::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let mut session =
//!         EditSession::load(EngineConfig::default(), store, NoopBlocker, "custom_role").await?;
//!
//!     session.apply_pending_edit(&["plugins"], AccessLevel::Write)?;
//!     let report = session.submit().await?;
//!     println!("{report:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `sysrole::core` - Pure computation (catalog, access, compile, membership)
//! - `sysrole::store` - Store traits and the in-memory store

pub mod commit;
pub mod error;
pub mod navigation;
pub mod session;

pub use sysrole_core as core;
pub use sysrole_store as store;

pub use commit::{CommitOutcome, CommitPlan, CommitReport, CommitState, Stage};
pub use error::{AggregatedError, CommitError, Result, SessionError};
pub use navigation::{BlockFlag, NavigationBlocker, NoopBlocker};
pub use session::{EditSession, EngineConfig};

pub use sysrole_core::{
    AccessLevel, Catalog, Direction, PendingEdits, Role, SectionAccess, Sentinels,
    SystemSection, User, UserId,
};
