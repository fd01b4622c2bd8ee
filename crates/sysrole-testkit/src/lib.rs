//! # Sysrole Testkit
//!
//! Testing utilities for sysrole.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenario vectors**: Named role edits with the permission set they must compile to
//! - **Generators**: Proptest strategies for roles, edits, and users
//! - **Fixtures**: A seeded in-memory store and session builder
//!
//! ## Scenario Vectors
//!
//! ```rust
//! use sysrole_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, compiled) in verify_all_vectors() {
//!     assert!(ok, "{name}: {compiled:?}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use sysrole_testkit::generators::{pending_edits, role};
//!
//! proptest! {
//!     #[test]
//!     fn compile_is_deterministic(r in role(), e in pending_edits()) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use sysrole_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let role = fixture.store.role("custom").unwrap();
//! assert!(role.permissions.is_empty());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{roster_users, TestFixture};
pub use generators::{access_level, pending_edits, role, user};
pub use vectors::{all_vectors, verify_all_vectors, ScenarioVector};
