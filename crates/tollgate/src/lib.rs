//! # Tollgate
//!
//! Per-capability authorization for a management application: actions,
//! configuration pages and individual configuration fields.
//!
//! ## Overview
//!
//! Tollgate answers one question, "may principal P see or use capability C",
//! and enforces the answer at the points where that matters:
//!
//! - **Actions**: the gated side effect runs only after an `Allowed` decision
//! - **Forms**: a page check, then per-field omission on render and per-field
//!   re-check on submit
//! - **CLI**: commands authorize before running and report denial with its
//!   own exit status
//! - **HTTP**: denial at the page or action level maps to 403
//!
//! ## Key Concepts
//!
//! - **Permission**: a tier in the implication DAG. A broader tier implies
//!   every narrower one below it.
//! - **Manage tier**: `overall.manage`, between administer and nothing. It
//!   is dormant unless activated at boot.
//! - **Capability**: an action, page or field tagged with exactly one
//!   required permission. Untagged means administer.
//! - **Decision**: allowed or denied, as a value. Denial is never an error.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tollgate::{Gatekeeper, SecurityContext, TollgateConfig};
//! use tollgate::capability::{Component, Declarations};
//! use tollgate::core::{catalog, Principal};
//! use tollgate::grants::GrantSet;
//!
//! struct Diagnostics;
//!
//! impl Component for Diagnostics {
//!     fn name(&self) -> &str {
//!         "diagnostics"
//!     }
//!
//!     fn declare(&self, decl: &mut Declarations<'_>) -> tollgate::capability::Result<()> {
//!         decl.action("computer.dumpExportTable")?;
//!         decl.action_requiring("computer.reconnect", catalog::MANAGE)?;
//!         Ok(())
//!     }
//! }
//!
//! let config = TollgateConfig::default().with_manage_permission(true);
//! let context = SecurityContext::builder(config)
//!     .component(Diagnostics)
//!     .build()
//!     .unwrap();
//!
//! let perms = context.standard();
//! context
//!     .replace_grants(GrantSet::builder().grant([perms.manage]).to("manager").build())
//!     .unwrap();
//!
//! let gatekeeper = Gatekeeper::new(Arc::new(context));
//! let manager = Principal::from("manager");
//!
//! assert!(gatekeeper.authorize_id(&manager, "computer.reconnect").unwrap().is_allowed());
//! assert!(gatekeeper.authorize_id(&manager, "computer.dumpExportTable").unwrap().is_denied());
//! ```
//!
//! ## Re-exports
//!
//! - `tollgate::core` - Permission registry and principals
//! - `tollgate::grants` - Grant sets and the grant store
//! - `tollgate::capability` - Capability declarations and forms

pub mod cli;
pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod form;
pub mod gatekeeper;
pub mod http;
pub mod plugins;

pub use tollgate_capability as capability;
pub use tollgate_core as core;
pub use tollgate_grants as grants;

pub use cli::{CliCommand, CliDispatcher, CommandError, CommandOutput, ExitStatus};
pub use config::{TollgateConfig, MANAGE_PERMISSION_ENV};
pub use context::{SecurityContext, SecurityContextBuilder};
pub use decision::{Decision, Denial, Gated};
pub use error::{Result, TollgateError};
pub use form::{
    ConfigStore, ConfigValues, DropReason, DroppedField, RenderedField, RenderedForm, Submission,
    SubmitReport,
};
pub use gatekeeper::Gatekeeper;
pub use crate::http::{status_for, HttpGate, HttpResponse};
pub use plugins::{
    DisablePluginCommand, InstallPluginCommand, PluginCommands, PluginError, PluginManager,
    DISABLE_PLUGIN, INSTALL_PLUGIN,
};

pub use tollgate_core::{PermissionId, Principal};
