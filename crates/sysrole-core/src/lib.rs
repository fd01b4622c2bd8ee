//! # Sysrole Core
//!
//! Pure primitives for editing a system console role: which console sections
//! a role may read or write, and which users hold the role.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over a role's committed state and a set of pending edits.
//!
//! ## Key Types
//!
//! - [`Catalog`] - The fixed tree of console sections plus the ancillary table
//! - [`PermissionName`] - Typed form of `sysconsole_<read|write>_<section>`
//! - [`AccessLevel`] / [`SectionAccess`] - Grantable and displayable access
//! - [`PendingEdits`] - Sparse per-section access edits
//! - [`MembershipEdits`] - Users pending addition to or removal from a role
//!
//! ## Computation
//!
//! - [`current_access`] / [`aggregate_access`] resolve what a section shows
//! - [`compile`] produces the closed permission set a role would have if committed
//! - [`save_needed`] decides whether anything would change on commit

pub mod access;
pub mod catalog;
pub mod compile;
pub mod dirty;
pub mod error;
pub mod membership;
pub mod permission;
pub mod types;

pub use access::{aggregate_access, current_access, AccessLevel, PendingEdits, SectionAccess};
pub use catalog::{Catalog, SystemSection};
pub use compile::compile;
pub use dirty::{permissions_changed, save_needed};
pub use error::{CoreError, Result};
pub use membership::{Direction, MembershipEdits};
pub use permission::{AccessKind, PermissionName, Sentinels, MANAGE_SYSTEM, SYSTEM_ADMIN_ROLE};
pub use types::{Role, User, UserId};
