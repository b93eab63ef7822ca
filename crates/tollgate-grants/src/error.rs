//! Error types for the grants module.

use thiserror::Error;

use tollgate_core::{CoreError, PermissionHandle};

/// Errors that can occur while building or replacing grant sets.
#[derive(Debug, Error)]
pub enum GrantError {
    /// A grant references a permission handle from another registry.
    #[error("grant references a permission outside this registry: {0:?}")]
    ForeignPermission(PermissionHandle),

    /// Persisted grant configuration could not be parsed.
    #[error("invalid grant configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for grant operations.
pub type Result<T> = std::result::Result<T, GrantError>;
