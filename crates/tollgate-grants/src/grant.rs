//! Grants and grant sets.
//!
//! A grant asserts that a principal (a user or a group) holds a permission
//! everywhere. A grant set is an immutable table of grants: one complete
//! authorization strategy.

use std::collections::HashMap;

use tollgate_core::{PermissionHandle, PermissionRegistry, Principal};

use crate::error::{GrantError, Result};

/// A principal holds a permission, globally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grant {
    /// User or group receiving the permission.
    pub principal: Principal,

    /// The permission held.
    pub permission: PermissionHandle,
}

impl Grant {
    /// Create a new grant.
    pub fn new(principal: impl Into<Principal>, permission: PermissionHandle) -> Self {
        Self {
            principal: principal.into(),
            permission,
        }
    }
}

/// An immutable table of grants.
#[derive(Debug, Clone, Default)]
pub struct GrantSet {
    /// All grants in insertion order.
    grants: Vec<Grant>,

    /// Index: principal -> permissions granted to it.
    by_principal: HashMap<Principal, Vec<PermissionHandle>>,
}

impl GrantSet {
    /// A set that grants nothing to anyone.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a set.
    pub fn builder() -> GrantSetBuilder {
        GrantSetBuilder::default()
    }

    /// Build a set from individual grants. Duplicates collapse.
    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        let mut set = Self::default();
        for grant in grants {
            set.insert(grant);
        }
        set
    }

    /// Build a set from resolved `(principal, permission id)` pairs.
    pub fn from_pairs<P, S>(
        registry: &PermissionRegistry,
        pairs: impl IntoIterator<Item = (P, S)>,
    ) -> Result<Self>
    where
        P: Into<Principal>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for (principal, permission) in pairs {
            let handle = registry.resolve(permission.as_ref())?;
            set.insert(Grant::new(principal, handle));
        }
        Ok(set)
    }

    fn insert(&mut self, grant: Grant) {
        let held = self.by_principal.entry(grant.principal.clone()).or_default();
        if held.contains(&grant.permission) {
            return;
        }
        held.push(grant.permission);
        self.grants.push(grant);
    }

    /// Permissions granted directly to `principal`.
    pub fn permissions_of(&self, principal: &Principal) -> &[PermissionHandle] {
        self.by_principal
            .get(principal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over all grants in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Grant> {
        self.grants.iter()
    }

    /// Number of distinct grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether the set grants nothing.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Check that every granted permission belongs to `registry`.
    pub fn validate(&self, registry: &PermissionRegistry) -> Result<()> {
        match self.grants.iter().find(|g| !registry.contains(g.permission)) {
            Some(grant) => Err(GrantError::ForeignPermission(grant.permission)),
            None => Ok(()),
        }
    }

    /// Whether any of `principals` holds a permission implying `required`.
    ///
    /// Disjunctive across grants and short-circuits on the first match, so
    /// grant order never changes the answer.
    pub fn holds_any<'a>(
        &self,
        registry: &PermissionRegistry,
        principals: impl IntoIterator<Item = &'a Principal>,
        required: PermissionHandle,
    ) -> bool {
        principals
            .into_iter()
            .flat_map(|principal| self.permissions_of(principal))
            .any(|&held| registry.implies(held, required))
    }
}

/// Fluent construction of a [`GrantSet`]:
/// `grant([..]).to("user")`, `grant([..]).to_everyone()`.
#[derive(Debug, Default)]
pub struct GrantSetBuilder {
    set: GrantSet,
}

impl GrantSetBuilder {
    /// Name the permissions of the next grant.
    pub fn grant(self, permissions: impl IntoIterator<Item = PermissionHandle>) -> PendingGrant {
        PendingGrant {
            builder: self,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Add a single prepared grant.
    pub fn with(mut self, grant: Grant) -> Self {
        self.set.insert(grant);
        self
    }

    /// Finish the set.
    pub fn build(self) -> GrantSet {
        self.set
    }
}

/// Permissions waiting for their recipient.
#[derive(Debug)]
#[must_use = "a pending grant does nothing until it is given a recipient"]
pub struct PendingGrant {
    builder: GrantSetBuilder,
    permissions: Vec<PermissionHandle>,
}

impl PendingGrant {
    /// Grant to one principal.
    pub fn to(self, principal: impl Into<Principal>) -> GrantSetBuilder {
        self.to_all([principal.into()])
    }

    /// Grant to several principals.
    pub fn to_all(self, principals: impl IntoIterator<Item = Principal>) -> GrantSetBuilder {
        let Self {
            mut builder,
            permissions,
        } = self;
        for principal in principals {
            for &permission in &permissions {
                builder.set.insert(Grant::new(principal.clone(), permission));
            }
        }
        builder
    }

    /// Grant to every principal, anonymous included.
    pub fn to_everyone(self) -> GrantSetBuilder {
        self.to(Principal::EVERYONE)
    }

    /// Grant to every authenticated principal.
    pub fn to_authenticated(self) -> GrantSetBuilder {
        self.to(Principal::AUTHENTICATED)
    }
}
