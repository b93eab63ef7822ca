//! # Tollgate Capability
//!
//! Declarations of what is protected and by which permission.
//!
//! ## Overview
//!
//! A [`Capability`] is an action ("install plugin"), a page ("global
//! configuration"), or a single configuration field ("number of executors"),
//! tagged with exactly one required permission. Unless its author explicitly
//! relaxes it, a capability requires the registry's broadest permission.
//!
//! Components declare their capabilities once, in an explicit registration
//! pass, through the [`Component`] trait. The resulting
//! [`CapabilityRegistry`] is immutable: changing a requirement means
//! redeploying the component.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tollgate_capability::{CapabilityRegistry, Component, Declarations, Result};
//! use tollgate_core::{catalog, standard_registry};
//!
//! struct GlobalConfig;
//!
//! impl Component for GlobalConfig {
//!     fn name(&self) -> &str {
//!         "global-config"
//!     }
//!
//!     fn declare(&self, decl: &mut Declarations<'_>) -> Result<()> {
//!         decl.form_requiring("configure", catalog::MANAGE)?
//!             .field("numExecutors")?
//!             .field_requiring("systemMessage", catalog::MANAGE)?
//!             .finish()
//!     }
//! }
//!
//! let (registry, perms) = standard_registry().unwrap();
//! let capabilities = CapabilityRegistry::builder(Arc::new(registry))
//!     .component(&GlobalConfig)
//!     .unwrap()
//!     .build();
//!
//! let form = capabilities.form("configure").unwrap();
//! assert_eq!(form.field("numExecutors").unwrap().required(), perms.administer);
//! ```

pub mod capability;
pub mod declare;
pub mod error;
pub mod form;
pub mod registry;

pub use capability::{Capability, CapabilityId, CapabilityKind};
pub use declare::{Component, Declarations, FormBuilder};
pub use error::{CapabilityError, Result};
pub use form::{Field, Form};
pub use registry::{CapabilityRegistry, CapabilityRegistryBuilder};
