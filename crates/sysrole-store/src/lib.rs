//! # Sysrole Store
//!
//! Storage abstraction for role editing. The engine never owns the role or
//! user records; it reads them and proposes replacements through the
//! [`RoleStore`] and [`UserStore`] traits.
//!
//! ## Key Types
//!
//! - [`RoleStore`] - Fetch a role, replace its permission set
//! - [`UserStore`] - Rewrite a user's role string, list a role's users
//! - [`MemoryStore`] - In-memory implementation for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sysrole_core::Role;
//! use sysrole_store::{MemoryStore, RoleStore};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     store.insert_role(Role::new("system_manager", ["sysconsole_read_plugins"]));
//!
//!     let role = store.fetch_role("system_manager").await.unwrap();
//!     assert!(role.has_permission("sysconsole_read_plugins"));
//! }
//! ```

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreCall};
pub use traits::{RoleStore, UserStore};
