//! # Tollgate Grants
//!
//! Principal-to-permission grants and the store that answers
//! "does principal P hold permission X".
//!
//! ## Overview
//!
//! A [`GrantSet`] is one complete authorization strategy: a flat table of
//! grants, all global in scope. Grants only add permission; there is no deny
//! entry, so adding a grant can never narrow anyone's access.
//!
//! The [`GrantStore`] holds the current set behind an `Arc` and replaces it
//! wholesale. A request takes a [`GrantView`] once and evaluates every check
//! against it, so it never observes half of an old set and half of a new one.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tollgate_core::{standard_registry, Principal};
//! use tollgate_grants::{GrantSet, GrantStore};
//!
//! let (registry, perms) = standard_registry().unwrap();
//! let registry = Arc::new(registry);
//!
//! let grants = GrantSet::builder()
//!     .grant([perms.administer])
//!     .to("admin")
//!     .grant([perms.read])
//!     .to_everyone()
//!     .build();
//!
//! let store = GrantStore::new(Arc::clone(&registry), grants).unwrap();
//! assert!(store.holds(&Principal::from("admin"), perms.read));
//! assert!(!store.holds(&Principal::from("bob"), perms.administer));
//! ```

pub mod config;
pub mod error;
pub mod grant;
pub mod identity;
pub mod store;

pub use config::{GrantConfig, GrantEntry};
pub use error::{GrantError, Result};
pub use grant::{Grant, GrantSet, GrantSetBuilder, PendingGrant};
pub use identity::{GroupResolver, NoGroups, StaticGroups};
pub use store::{GrantStore, GrantView};
