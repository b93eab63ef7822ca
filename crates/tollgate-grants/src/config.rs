//! Persisted grant configuration.
//!
//! The storage format is owned by whoever persists it; this module only
//! defines the JSON shape Tollgate accepts and resolves it against a
//! registry. An unknown permission id fails the whole load.
//!
//! ```json
//! { "grants": [ { "principal": "manager", "permissions": ["overall.read", "overall.manage"] } ] }
//! ```

use serde::{Deserialize, Serialize};

use tollgate_core::{PermissionId, PermissionRegistry, Principal};

use crate::error::Result;
use crate::grant::GrantSet;

/// A persisted authorization strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantConfig {
    #[serde(default)]
    pub grants: Vec<GrantEntry>,
}

/// Permissions granted to one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    pub principal: Principal,
    pub permissions: Vec<PermissionId>,
}

impl GrantConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Flatten into `(principal, permission id)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (Principal, &PermissionId)> {
        self.grants.iter().flat_map(|entry| {
            entry
                .permissions
                .iter()
                .map(move |permission| (entry.principal.clone(), permission))
        })
    }

    /// Resolve into a grant set.
    pub fn resolve(&self, registry: &PermissionRegistry) -> Result<GrantSet> {
        GrantSet::from_pairs(registry, self.pairs())
    }
}
