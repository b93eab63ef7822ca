//! Group membership, supplied by the identity collaborator.
//!
//! Tollgate does not authenticate anyone. It asks a [`GroupResolver`] which
//! groups a principal belongs to and checks grants on all of them. The
//! well-known groups (`@everyone`, `@authenticated`) are added by the grant
//! store itself and need not be returned here.

use std::collections::HashMap;

use tollgate_core::Principal;

/// Resolves the groups a principal belongs to.
pub trait GroupResolver: Send + Sync {
    /// Groups of `principal`, excluding the well-known implicit groups.
    fn groups_of(&self, principal: &Principal) -> Vec<Principal>;
}

/// A resolver under which nobody belongs to any explicit group.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGroups;

impl GroupResolver for NoGroups {
    fn groups_of(&self, _principal: &Principal) -> Vec<Principal> {
        Vec::new()
    }
}

/// A fixed membership table.
#[derive(Debug, Clone, Default)]
pub struct StaticGroups {
    membership: HashMap<Principal, Vec<Principal>>,
}

impl StaticGroups {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `member` to `group`.
    pub fn with(mut self, member: impl Into<Principal>, group: impl Into<Principal>) -> Self {
        let group = group.into();
        let groups = self.membership.entry(member.into()).or_default();
        if !groups.contains(&group) {
            groups.push(group);
        }
        self
    }
}

impl GroupResolver for StaticGroups {
    fn groups_of(&self, principal: &Principal) -> Vec<Principal> {
        self.membership.get(principal).cloned().unwrap_or_default()
    }
}
