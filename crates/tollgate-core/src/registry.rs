//! The permission registry: a fixed catalog and its implication forest.
//!
//! Permissions are registered once at startup through a
//! [`PermissionRegistryBuilder`]. Each permission names at most one broader
//! permission that implies it. Registration rejects duplicates and cycles, so
//! the built registry is a forest and queries are plain parent walks.
//!
//! The only runtime mutation is [`PermissionRegistry::set_enabled`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::{CoreError, Result};
use crate::types::{PermissionHandle, PermissionId};

/// Declaration of a permission, consumed by the registry builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSpec {
    /// Stable identifier.
    pub id: PermissionId,

    /// Display group (e.g. "Overall").
    pub group: String,

    /// Optional human-readable description.
    pub description: Option<String>,

    /// The broader permission that implies this one.
    pub implied_by: Option<PermissionId>,

    /// Initial enablement.
    pub enabled: bool,
}

impl PermissionSpec {
    /// Create an enabled root permission.
    pub fn new(id: impl Into<PermissionId>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            description: None,
            implied_by: None,
            enabled: true,
        }
    }

    /// Attach a description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the broader permission that implies this one.
    pub fn implied_by(mut self, parent: impl Into<PermissionId>) -> Self {
        self.implied_by = Some(parent.into());
        self
    }

    /// Set the initial enablement.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A registered permission.
#[derive(Debug)]
pub struct PermissionEntry {
    id: PermissionId,
    group: String,
    description: Option<String>,
    implied_by: Option<PermissionHandle>,
    enabled: AtomicBool,
}

impl PermissionEntry {
    /// Stable identifier.
    pub fn id(&self) -> &PermissionId {
        &self.id
    }

    /// Display group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The broader permission that implies this one, if any.
    pub fn implied_by(&self) -> Option<PermissionHandle> {
        self.implied_by
    }

    /// Current enablement.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

/// Source of registry stamps. Every builder takes a fresh one.
static NEXT_REGISTRY: AtomicU32 = AtomicU32::new(1);

/// Collects permission declarations and validates them into a registry.
#[derive(Debug)]
pub struct PermissionRegistryBuilder {
    stamp: u32,
    specs: Vec<PermissionSpec>,
    index: HashMap<PermissionId, usize>,
}

impl Default for PermissionRegistryBuilder {
    fn default() -> Self {
        Self {
            stamp: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            specs: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl PermissionRegistryBuilder {
    /// Create an empty builder.
    ///
    /// Handles it issues are valid only against the registry it builds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a permission.
    ///
    /// The parent may be registered later; dangling parents are rejected by
    /// [`build`](Self::build). A parent chain that leads back to the new id
    /// is rejected here with [`CoreError::Cycle`].
    pub fn register(&mut self, spec: PermissionSpec) -> Result<PermissionHandle> {
        if self.index.contains_key(&spec.id) {
            return Err(CoreError::DuplicateId(spec.id));
        }

        if let Some(parent) = &spec.implied_by {
            // Registered entries already form a forest, so this walk ends at
            // a root or at a not-yet-registered parent.
            let mut cursor = Some(parent);
            while let Some(id) = cursor {
                if *id == spec.id {
                    return Err(CoreError::Cycle {
                        id: spec.id.clone(),
                        through: parent.clone(),
                    });
                }
                cursor = self
                    .index
                    .get(id)
                    .and_then(|&i| self.specs[i].implied_by.as_ref());
            }
        }

        let position = self.specs.len();
        self.index.insert(spec.id.clone(), position);
        self.specs.push(spec);
        Ok(PermissionHandle::new(self.stamp, position))
    }

    /// Look up the handle a registered id will have in the built registry.
    pub fn handle(&self, id: &str) -> Option<PermissionHandle> {
        self.index.get(id).map(|&i| PermissionHandle::new(self.stamp, i))
    }

    /// Resolve parent links and produce the registry.
    pub fn build(self) -> Result<PermissionRegistry> {
        let stamp = self.stamp;
        let mut entries = Vec::with_capacity(self.specs.len());
        let mut root = None;

        for (position, spec) in self.specs.into_iter().enumerate() {
            let implied_by = match spec.implied_by {
                Some(parent) => match self.index.get(&parent) {
                    Some(&i) => Some(PermissionHandle::new(stamp, i)),
                    None => return Err(CoreError::UnknownPermission(parent.to_string())),
                },
                None => {
                    root.get_or_insert(PermissionHandle::new(stamp, position));
                    None
                }
            };

            entries.push(PermissionEntry {
                id: spec.id,
                group: spec.group,
                description: spec.description,
                implied_by,
                enabled: AtomicBool::new(spec.enabled),
            });
        }

        let root = root.ok_or(CoreError::NoRootPermission)?;
        let index = self
            .index
            .into_iter()
            .map(|(id, i)| (id, PermissionHandle::new(stamp, i)))
            .collect();

        Ok(PermissionRegistry {
            stamp,
            entries,
            index,
            root,
            update_lock: Mutex::new(()),
        })
    }
}

/// The process-wide permission catalog.
///
/// Reads (`implies`, `is_enabled`) take no locks. Enablement flags are
/// atomics; writers of those flags are serialized by a single update lock.
#[derive(Debug)]
pub struct PermissionRegistry {
    stamp: u32,
    entries: Vec<PermissionEntry>,
    index: HashMap<PermissionId, PermissionHandle>,
    root: PermissionHandle,
    update_lock: Mutex<()>,
}

impl PermissionRegistry {
    /// Start building a registry.
    pub fn builder() -> PermissionRegistryBuilder {
        PermissionRegistryBuilder::new()
    }

    /// The broadest permission: the first registered root.
    ///
    /// Capabilities that do not name a requirement default to this.
    pub fn broadest(&self) -> PermissionHandle {
        self.root
    }

    /// Look up a permission by id.
    pub fn handle(&self, id: &str) -> Option<PermissionHandle> {
        self.index.get(id).copied()
    }

    /// Look up a permission by id, failing if it is not registered.
    pub fn resolve(&self, id: &str) -> Result<PermissionHandle> {
        self.handle(id)
            .ok_or_else(|| CoreError::UnknownPermission(id.to_owned()))
    }

    /// Get a registered permission.
    pub fn get(&self, handle: PermissionHandle) -> Option<&PermissionEntry> {
        if handle.registry() != self.stamp {
            return None;
        }
        self.entries.get(handle.index())
    }

    /// Get the id of a registered permission.
    pub fn id_of(&self, handle: PermissionHandle) -> Option<&PermissionId> {
        self.get(handle).map(PermissionEntry::id)
    }

    /// Whether `handle` was issued by this registry.
    pub fn contains(&self, handle: PermissionHandle) -> bool {
        handle.registry() == self.stamp && handle.index() < self.entries.len()
    }

    /// Number of registered permissions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty. A built registry never is.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all permissions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PermissionHandle, &PermissionEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(move |(i, entry)| (PermissionHandle::new(self.stamp, i), entry))
    }

    /// Iterate over the permissions of one display group.
    pub fn group<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = (PermissionHandle, &'a PermissionEntry)> + 'a {
        self.iter().filter(move |(_, entry)| entry.group == group)
    }

    /// Current enablement. Unknown handles are treated as disabled.
    pub fn is_enabled(&self, handle: PermissionHandle) -> bool {
        self.get(handle).is_some_and(PermissionEntry::is_enabled)
    }

    /// Enable or disable a permission process-wide.
    ///
    /// Returns the previous value. The change is visible to every subsequent
    /// [`implies`](Self::implies) call.
    pub fn set_enabled(&self, handle: PermissionHandle, enabled: bool) -> Result<bool> {
        let entry = self.get(handle).ok_or(CoreError::UnknownHandle(handle))?;

        let _guard = self
            .update_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = entry.enabled.swap(enabled, Ordering::AcqRel);

        if previous != enabled {
            tracing::info!(permission = %entry.id, enabled, "permission enablement changed");
        }
        Ok(previous)
    }

    /// Whether holding `held` counts as holding `required`.
    ///
    /// True iff `held` is enabled and is `required` itself or one of its
    /// ancestors. Only the enablement of `held` is consulted: a disabled
    /// permission implies nothing, including itself, while an enabled broader
    /// permission still implies a disabled narrower one.
    pub fn implies(&self, held: PermissionHandle, required: PermissionHandle) -> bool {
        if !self.is_enabled(held) {
            return false;
        }
        self.ancestors(required).any(|ancestor| ancestor == held)
    }

    /// Walk from `handle` up through its implying permissions, inclusive.
    pub fn ancestors(&self, handle: PermissionHandle) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            cursor: self.contains(handle).then_some(handle),
        }
    }
}

/// Iterator over a permission and the permissions that imply it.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    registry: &'a PermissionRegistry,
    cursor: Option<PermissionHandle>,
}

impl Iterator for Ancestors<'_> {
    type Item = PermissionHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.registry.get(current).and_then(PermissionEntry::implied_by);
        Some(current)
    }
}
