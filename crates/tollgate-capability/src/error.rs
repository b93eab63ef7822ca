//! Error types for capability declaration.

use thiserror::Error;

use tollgate_core::CoreError;

use crate::capability::CapabilityId;

/// Errors raised while components declare capabilities.
///
/// These are registration-time failures; a component that fails to declare
/// must not be loaded.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The same capability id was declared twice.
    #[error("capability already declared: {0}")]
    DuplicateCapability(CapabilityId),

    /// A form declared the same field twice.
    #[error("field {field} declared twice in form {form}")]
    DuplicateField { form: CapabilityId, field: String },

    /// A lookup named a capability nobody declared.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// A declaration referenced an unregistered permission.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for capability operations.
pub type Result<T> = std::result::Result<T, CapabilityError>;
