//! # Tollgate Testkit
//!
//! Testing utilities for Tollgate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a small management application (global configuration,
//!   label configuration, diagnostics, plugin commands) with in-memory
//!   collaborators
//! - **Generators**: Proptest strategies over permission hierarchies and
//!   grant sets
//!
//! ## Test Fixtures
//!
//! ```rust
//! use tollgate::core::Principal;
//! use tollgate::grants::GrantSet;
//! use tollgate_testkit::fixtures::{Scenario, CONFIGURE};
//!
//! let scenario = Scenario::new().unwrap();
//! scenario
//!     .grant(|perms| GrantSet::builder().grant([perms.manage, perms.read]).to("manager").build())
//!     .unwrap();
//!
//! let rendered = scenario
//!     .render(&Principal::from("manager"), CONFIGURE)
//!     .unwrap()
//!     .allowed()
//!     .unwrap();
//! assert!(!rendered.contains("numExecutors"));
//! assert!(rendered.contains("systemMessage"));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tollgate_testkit::generators::{build_registry, HierarchyParams};
//!
//! proptest! {
//!     #[test]
//!     fn hierarchy_builds(params: HierarchyParams) {
//!         let (registry, handles) = build_registry(&params).unwrap();
//!         prop_assert_eq!(registry.len(), handles.len());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    ComputerDiagnostics, GlobalConfiguration, LabelConfiguration, MemoryConfigStore,
    MemoryPluginManager, Scenario,
};
pub use generators::{build_registry, grant_set, HierarchyParams};
