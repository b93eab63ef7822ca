//! Error types for Tollgate.
//!
//! None of these is an authorization denial. Denials are values
//! ([`Decision`](crate::Decision), [`Gated`](crate::Gated)); errors are
//! startup misconfiguration or collaborator failures.

use tollgate_capability::CapabilityError;
use tollgate_core::CoreError;
use tollgate_grants::GrantError;
use thiserror::Error;

/// Errors that can occur while building or using a security context.
#[derive(Debug, Error)]
pub enum TollgateError {
    /// Permission registry error.
    #[error("permission registry error: {0}")]
    Core(#[from] CoreError),

    /// Grant store error.
    #[error("grant error: {0}")]
    Grant(#[from] GrantError),

    /// Capability declaration error.
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration store failed to load or persist values.
    #[error("configuration store error: {0}")]
    Store(String),

    /// A CLI command name was registered twice.
    #[error("command already registered: {0}")]
    DuplicateCommand(String),
}

/// Result type for Tollgate operations.
pub type Result<T> = std::result::Result<T, TollgateError>;
