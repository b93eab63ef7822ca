//! The grant store: the current grant set, replaceable wholesale.
//!
//! The current set lives behind an `Arc`. Readers clone the `Arc` and work
//! on an immutable snapshot; [`GrantStore::replace`] swaps in a new `Arc`.
//! A reader therefore sees either the old set or the new one, never a mix.
//!
//! Readers do take the `RwLock` read guard, but only for as long as it
//! takes to clone the `Arc`; authorization checks run against the clone
//! with no lock held. The write guard serializes replacements.

use std::sync::{Arc, RwLock};

use tollgate_core::{PermissionHandle, PermissionRegistry, Principal};

use crate::error::Result;
use crate::grant::GrantSet;
use crate::identity::{GroupResolver, NoGroups};

/// Holds the current grant set for the process.
pub struct GrantStore {
    registry: Arc<PermissionRegistry>,
    groups: Arc<dyn GroupResolver>,
    current: RwLock<Arc<GrantSet>>,
}

impl GrantStore {
    /// Create a store with no explicit group memberships.
    pub fn new(registry: Arc<PermissionRegistry>, grants: GrantSet) -> Result<Self> {
        Self::with_groups(registry, grants, Arc::new(NoGroups))
    }

    /// Create a store that resolves group membership through `groups`.
    pub fn with_groups(
        registry: Arc<PermissionRegistry>,
        grants: GrantSet,
        groups: Arc<dyn GroupResolver>,
    ) -> Result<Self> {
        grants.validate(&registry)?;
        Ok(Self {
            registry,
            groups,
            current: RwLock::new(Arc::new(grants)),
        })
    }

    /// The registry grants are evaluated against.
    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    /// The current grant set.
    pub fn snapshot(&self) -> Arc<GrantSet> {
        let current = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&current)
    }

    /// A consistent view for one request.
    pub fn view(&self) -> GrantView<'_> {
        GrantView {
            grants: self.snapshot(),
            registry: &self.registry,
            groups: self.groups.as_ref(),
        }
    }

    /// Whether `principal` holds a permission implying `required`.
    pub fn holds(&self, principal: &Principal, required: PermissionHandle) -> bool {
        self.view().holds(principal, required)
    }

    /// Atomically replace the whole grant set. Returns the previous set.
    pub fn replace(&self, grants: GrantSet) -> Result<Arc<GrantSet>> {
        grants.validate(&self.registry)?;
        let grants = Arc::new(grants);

        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = std::mem::replace(&mut *current, Arc::clone(&grants));

        tracing::info!(
            previous = previous.len(),
            current = grants.len(),
            "grant set replaced"
        );
        Ok(previous)
    }
}

impl std::fmt::Debug for GrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantStore")
            .field("grants", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

/// One grant set, pinned for the duration of a request.
#[derive(Clone)]
pub struct GrantView<'a> {
    grants: Arc<GrantSet>,
    registry: &'a PermissionRegistry,
    groups: &'a dyn GroupResolver,
}

impl<'a> GrantView<'a> {
    /// The pinned grant set.
    pub fn grants(&self) -> &GrantSet {
        &self.grants
    }

    /// The registry this view evaluates against.
    pub fn registry(&self) -> &'a PermissionRegistry {
        self.registry
    }

    /// Whether `principal`, one of its groups, or a well-known group it
    /// belongs to holds a permission implying `required`.
    pub fn holds(&self, principal: &Principal, required: PermissionHandle) -> bool {
        let groups = self.groups.groups_of(principal);
        let principals = std::iter::once(principal)
            .chain(principal.implicit_groups())
            .chain(groups.iter());

        self.grants.holds_any(self.registry, principals, required)
    }
}

impl std::fmt::Debug for GrantView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantView")
            .field("grants", &self.grants.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrantError;
    use crate::identity::StaticGroups;
    use tollgate_core::{standard_registry, PermissionSpec, StandardPermissions};

    fn store_with(grants: impl FnOnce(&StandardPermissions) -> GrantSet) -> (GrantStore, StandardPermissions) {
        let (registry, perms) = standard_registry().unwrap();
        registry.set_enabled(perms.manage, true).unwrap();
        let store = GrantStore::new(Arc::new(registry), grants(&perms)).unwrap();
        (store, perms)
    }

    #[test]
    fn test_holds_direct_and_implied() {
        let (store, perms) = store_with(|p| {
            GrantSet::builder().grant([p.administer]).to("admin").build()
        });
        let admin = Principal::from("admin");

        assert!(store.holds(&admin, perms.administer));
        assert!(store.holds(&admin, perms.manage));
        assert!(store.holds(&admin, perms.read));
    }

    #[test]
    fn test_no_grant_means_deny() {
        let (store, perms) = store_with(|_| GrantSet::empty());
        assert!(!store.holds(&Principal::from("bob"), perms.read));
    }

    #[test]
    fn test_everyone_grant_covers_anonymous() {
        let (store, perms) = store_with(|p| GrantSet::builder().grant([p.read]).to_everyone().build());

        assert!(store.holds(&Principal::ANONYMOUS, perms.read));
        assert!(store.holds(&Principal::from("carol"), perms.read));
    }

    #[test]
    fn test_authenticated_grant_excludes_anonymous() {
        let (store, perms) = store_with(|p| {
            GrantSet::builder().grant([p.read]).to_authenticated().build()
        });

        assert!(!store.holds(&Principal::ANONYMOUS, perms.read));
        assert!(store.holds(&Principal::from("carol"), perms.read));
    }

    #[test]
    fn test_group_membership() {
        let (registry, perms) = standard_registry().unwrap();
        let grants = GrantSet::builder().grant([perms.administer]).to("admins").build();
        let groups = StaticGroups::new().with("alice", "admins");
        let store = GrantStore::with_groups(Arc::new(registry), grants, Arc::new(groups)).unwrap();

        assert!(store.holds(&Principal::from("alice"), perms.administer));
        assert!(!store.holds(&Principal::from("bob"), perms.administer));
    }

    #[test]
    fn test_replace_swaps_whole_set() {
        let (store, perms) = store_with(|p| GrantSet::builder().grant([p.administer]).to("alice").build());
        let alice = Principal::from("alice");
        let pinned = store.view();

        let previous = store
            .replace(GrantSet::builder().grant([perms.read]).to("alice").build())
            .unwrap();

        assert_eq!(previous.len(), 1);
        assert!(!store.holds(&alice, perms.administer));
        assert!(store.holds(&alice, perms.read));
        // A view taken before the swap keeps answering from the old set.
        assert!(pinned.holds(&alice, perms.administer));
    }

    #[test]
    fn test_replace_rejects_foreign_handles() {
        let (store, _) = store_with(|_| GrantSet::empty());

        let mut builder = tollgate_core::PermissionRegistry::builder();
        for i in 0..5 {
            let spec = match i {
                0 => PermissionSpec::new("root", "g"),
                _ => PermissionSpec::new(format!("p{i}"), "g").implied_by("root"),
            };
            builder.register(spec).unwrap();
        }
        let other = builder.build().unwrap();
        let foreign = other.resolve("p4").unwrap();

        let err = store
            .replace(GrantSet::builder().grant([foreign]).to("x").build())
            .unwrap_err();
        assert!(matches!(err, GrantError::ForeignPermission(_)));
    }

    #[test]
    fn test_replace_rejects_in_range_handle_from_another_registry() {
        let (store, perms) = store_with(|_| GrantSet::empty());

        let mut builder = tollgate_core::PermissionRegistry::builder();
        let guest = builder.register(PermissionSpec::new("guest.view", "g")).unwrap();
        let _other = builder.build().unwrap();
        assert!(guest.index() < store.registry().len());

        let err = store
            .replace(GrantSet::builder().grant([guest]).to("visitor").build())
            .unwrap_err();
        assert!(matches!(err, GrantError::ForeignPermission(_)));
        assert!(!store.holds(&Principal::from("visitor"), perms.administer));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_disabled_grant_contributes_nothing() {
        let (registry, perms) = standard_registry().unwrap();
        let grants = GrantSet::builder().grant([perms.manage]).to("manager").build();
        let store = GrantStore::new(Arc::new(registry), grants).unwrap();

        assert!(!store.holds(&Principal::from("manager"), perms.manage));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_everyone_grant_reaches_every_principal(name in "[a-z][a-z0-9_-]{0,15}") {
                let (store, perms) = store_with(|perms| {
                    GrantSet::builder().grant([perms.read]).to_everyone().build()
                });

                prop_assert!(store.holds(&Principal::from(name), perms.read));
                prop_assert!(store.holds(&Principal::ANONYMOUS, perms.read));
            }

            #[test]
            fn test_authenticated_grant_skips_anonymous(name in "[a-z][a-z0-9_-]{0,15}") {
                prop_assume!(name != "anonymous");
                let (store, perms) = store_with(|perms| {
                    GrantSet::builder().grant([perms.read]).to_authenticated().build()
                });

                prop_assert!(store.holds(&Principal::from(name), perms.read));
                prop_assert!(!store.holds(&Principal::ANONYMOUS, perms.read));
            }
        }
    }
}
