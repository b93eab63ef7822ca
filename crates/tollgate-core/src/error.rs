//! Error types for Tollgate Core.

use thiserror::Error;

use crate::types::{PermissionHandle, PermissionId};

/// Errors raised while building or mutating the permission registry.
///
/// All of these are startup errors: a process that hits one should refuse to
/// serve requests rather than run with a partial catalog.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("permission already registered: {0}")]
    DuplicateId(PermissionId),

    #[error("implication cycle: {id} would be implied by {through}, which it already implies")]
    Cycle {
        id: PermissionId,
        through: PermissionId,
    },

    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    #[error("permission handle {0:?} does not belong to this registry")]
    UnknownHandle(PermissionHandle),

    #[error("registry has no root permission")]
    NoRootPermission,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
