//! Proptest generators for property-based testing.

use proptest::prelude::*;

use tollgate::core::{PermissionHandle, PermissionRegistry, PermissionSpec, Principal};
use tollgate::grants::{Grant, GrantSet};

/// Principals drawn on by generated grants. Includes the anonymous caller.
pub const PRINCIPALS: [&str; 4] = ["alice", "bob", "carol", "anonymous"];

/// Maximum number of permissions in a generated hierarchy.
pub const MAX_PERMISSIONS: usize = 8;

/// Shape of a generated permission forest.
///
/// Permission `i` may only be implied by a permission with a lower index,
/// so every generated hierarchy is acyclic.
#[derive(Debug, Clone)]
pub struct HierarchyParams {
    pub parents: Vec<Option<usize>>,
    pub enabled: Vec<bool>,
}

impl HierarchyParams {
    /// Number of permissions.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the hierarchy is empty. Generated hierarchies never are.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl Arbitrary for HierarchyParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (1..=MAX_PERMISSIONS)
            .prop_flat_map(|n| {
                let parents = (0..n)
                    .map(|i| {
                        if i == 0 {
                            Just(None).boxed()
                        } else {
                            proptest::option::weighted(0.85, 0..i).boxed()
                        }
                    })
                    .collect::<Vec<_>>();
                (parents, prop::collection::vec(any::<bool>(), n))
            })
            .prop_map(|(parents, enabled)| HierarchyParams { parents, enabled })
            .boxed()
    }
}

/// Id of generated permission `i`.
pub fn permission_id(i: usize) -> String {
    format!("generated.p{i}")
}

/// Build the registry described by `params`. Handles are returned in index
/// order.
pub fn build_registry(
    params: &HierarchyParams,
) -> tollgate::core::Result<(PermissionRegistry, Vec<PermissionHandle>)> {
    let mut builder = PermissionRegistry::builder();
    let mut handles = Vec::with_capacity(params.len());

    for (i, (parent, enabled)) in params.parents.iter().zip(&params.enabled).enumerate() {
        let mut spec = PermissionSpec::new(permission_id(i), "Generated").enabled(*enabled);
        if let Some(parent) = parent {
            spec = spec.implied_by(permission_id(*parent));
        }
        handles.push(builder.register(spec)?);
    }

    Ok((builder.build()?, handles))
}

/// Generate `(principal index, permission index)` grant pairs.
pub fn grant_pairs(permissions: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..PRINCIPALS.len(), 0..permissions), 0..12)
}

/// Turn grant pairs into a grant set over `handles`.
pub fn grant_set(pairs: &[(usize, usize)], handles: &[PermissionHandle]) -> GrantSet {
    GrantSet::from_grants(
        pairs
            .iter()
            .map(|&(p, h)| Grant::new(Principal::from(PRINCIPALS[p]), handles[h])),
    )
}

/// Generate a hierarchy together with grants over it.
pub fn hierarchy_with_grants() -> impl Strategy<Value = (HierarchyParams, Vec<(usize, usize)>)> {
    any::<HierarchyParams>().prop_flat_map(|params| {
        let n = params.len();
        (Just(params), grant_pairs(n))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use tollgate::grants::GrantStore;
    use tollgate::Submission;

    use crate::fixtures::{Scenario, CONFIGURE};

    fn store(params: &HierarchyParams, pairs: &[(usize, usize)]) -> (GrantStore, Vec<PermissionHandle>) {
        let (registry, handles) = build_registry(params).unwrap();
        let grants = grant_set(pairs, &handles);
        (GrantStore::new(Arc::new(registry), grants).unwrap(), handles)
    }

    proptest! {
        #[test]
        fn test_broader_permission_subsumes_narrower((params, pairs) in hierarchy_with_grants()) {
            let (store, handles) = store(&params, &pairs);
            let registry = store.registry();

            for name in PRINCIPALS {
                let principal = Principal::from(name);
                for &held in &handles {
                    for &required in &handles {
                        if registry.implies(held, required) && store.holds(&principal, held) {
                            prop_assert!(store.holds(&principal, required));
                        }
                    }
                }
            }
        }

        #[test]
        fn test_disabled_permission_implies_nothing((params, pairs) in hierarchy_with_grants()) {
            let (store, handles) = store(&params, &pairs);
            let registry = store.registry();

            for (i, &held) in handles.iter().enumerate() {
                if !params.enabled[i] {
                    for &required in &handles {
                        prop_assert!(!registry.implies(held, required));
                    }
                }
            }
        }

        #[test]
        fn test_grants_of_disabled_permissions_confer_nothing((params, pairs) in hierarchy_with_grants()) {
            let disabled_only: Vec<_> = pairs
                .iter()
                .copied()
                .filter(|&(_, h)| !params.enabled[h])
                .collect();
            let (store, handles) = store(&params, &disabled_only);

            for name in PRINCIPALS {
                for &required in &handles {
                    prop_assert!(!store.holds(&Principal::from(name), required));
                }
            }
        }

        #[test]
        fn test_decisions_are_idempotent((params, pairs) in hierarchy_with_grants()) {
            let (store, handles) = store(&params, &pairs);

            for name in PRINCIPALS {
                let principal = Principal::from(name);
                for &required in &handles {
                    let first = store.holds(&principal, required);
                    for _ in 0..3 {
                        prop_assert_eq!(store.holds(&principal, required), first);
                    }
                }
            }
        }

        #[test]
        fn test_grant_order_does_not_matter((params, pairs) in hierarchy_with_grants()) {
            let mut reversed = pairs.clone();
            reversed.reverse();
            let (forward, handles) = store(&params, &pairs);
            let (backward, _) = store(&params, &reversed);

            for name in PRINCIPALS {
                let principal = Principal::from(name);
                for &required in &handles {
                    prop_assert_eq!(forward.holds(&principal, required), backward.holds(&principal, required));
                }
            }
        }

        #[test]
        fn test_manager_submissions_only_touch_manage_fields(
            fields in prop::sample::subsequence(
                vec!["numExecutors", "shell", "globalProperties", "administrativeMonitors", "systemMessage", "quietPeriod"],
                0..=6,
            ),
            value in any::<u16>(),
        ) {
            let scenario = Scenario::new().unwrap();
            scenario
                .grant(|perms| GrantSet::builder().grant([perms.manage, perms.read]).to("manager").build())
                .unwrap();

            let submission = fields
                .iter()
                .fold(Submission::new(), |submission, field| submission.with(*field, value));
            let report = scenario
                .submit(&Principal::from("manager"), CONFIGURE, &submission)
                .unwrap()
                .allowed()
                .unwrap();

            for field in &fields {
                let writable = matches!(*field, "systemMessage" | "quietPeriod");
                prop_assert_eq!(report.persisted(field), writable);
                prop_assert_eq!(report.dropped(field), !writable);
                if writable {
                    prop_assert_eq!(scenario.config.get(CONFIGURE, field), Some(json!(value)));
                }
            }
            prop_assert_eq!(scenario.config.get(CONFIGURE, "numExecutors"), Some(json!(2)));
            prop_assert_eq!(scenario.config.get(CONFIGURE, "shell"), Some(json!("/bin/sh")));
        }
    }
}
