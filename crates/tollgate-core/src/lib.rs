//! # Tollgate Core
//!
//! Pure primitives for the Tollgate authorization engine: permissions, the
//! implication registry, and principals.
//!
//! This crate contains no I/O and no grant state. It answers one question:
//! does holding permission A count as holding permission B?
//!
//! ## Key Types
//!
//! - [`PermissionId`] - Stable string identifier (e.g. `"overall.manage"`)
//! - [`PermissionHandle`] - Cheap copyable reference into a registry
//! - [`PermissionRegistry`] - The fixed catalog and its implication forest
//! - [`Principal`] - Opaque identity of a user or group
//!
//! ## Implication
//!
//! Every permission names at most one broader permission that implies it.
//! The resulting forest is checked for cycles while it is built, so queries
//! walk parent links without cycle detection:
//!
//! ```rust
//! use tollgate_core::catalog::standard_registry;
//!
//! let (registry, perms) = standard_registry().unwrap();
//! assert!(registry.implies(perms.administer, perms.read));
//! assert!(!registry.implies(perms.read, perms.administer));
//! ```
//!
//! ## Enablement
//!
//! A permission can be disabled process-wide. A disabled permission implies
//! nothing, including itself. The standard catalog ships the manage tier
//! disabled; it is switched on once at startup.

pub mod catalog;
pub mod error;
pub mod registry;
pub mod types;

pub use catalog::{standard_registry, StandardPermissions};
pub use error::{CoreError, Result};
pub use registry::{PermissionEntry, PermissionRegistry, PermissionRegistryBuilder, PermissionSpec};
pub use types::{PermissionHandle, PermissionId, Principal};
