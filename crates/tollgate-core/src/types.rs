//! Strong type definitions for Tollgate.
//!
//! Identifiers are newtypes so a permission id cannot be passed where a
//! principal is expected.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;

/// Stable string identifier of a permission, e.g. `"overall.manage"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(Cow<'static, str>);

impl PermissionId {
    /// Create an identifier from a static string without allocating.
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Create an identifier from any string.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermissionId({})", self.0)
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PermissionId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for PermissionId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl AsRef<str> for PermissionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PermissionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A resolved reference to a registered permission.
///
/// Handles carry the stamp of the registry that issued them and an index
/// into it, so a handle is only meaningful against that registry. They are
/// `Copy`, so grant tables and capability declarations store handles instead
/// of cloning string ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionHandle {
    registry: u32,
    index: u32,
}

impl PermissionHandle {
    pub(crate) fn new(registry: u32, index: usize) -> Self {
        Self {
            registry,
            index: index as u32,
        }
    }

    /// Stamp of the issuing registry.
    pub(crate) fn registry(self) -> u32 {
        self.registry
    }

    /// Position of the permission in registration order.
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for PermissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermissionHandle({}#{})", self.registry, self.index)
    }
}

/// An opaque identity: an authenticated user or a group.
///
/// Tollgate never looks inside a principal; it is a lookup key into grant
/// tables. A few names are reserved for well-known identities.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(Cow<'static, str>);

impl Principal {
    /// The unauthenticated caller.
    pub const ANONYMOUS: Self = Self(Cow::Borrowed("anonymous"));

    /// Group every principal belongs to, including [`Principal::ANONYMOUS`].
    pub const EVERYONE: Self = Self(Cow::Borrowed("@everyone"));

    /// Group every principal except [`Principal::ANONYMOUS`] belongs to.
    pub const AUTHENTICATED: Self = Self(Cow::Borrowed("@authenticated"));

    /// Create a principal from any string.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Get the principal name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the unauthenticated caller.
    pub fn is_anonymous(&self) -> bool {
        *self == Self::ANONYMOUS
    }

    /// The well-known groups this principal implicitly belongs to.
    pub fn implicit_groups(&self) -> &'static [Principal] {
        static ANONYMOUS_GROUPS: [Principal; 1] = [Principal::EVERYONE];
        static USER_GROUPS: [Principal; 2] = [Principal::EVERYONE, Principal::AUTHENTICATED];

        if self.is_anonymous() {
            &ANONYMOUS_GROUPS
        } else {
            &USER_GROUPS
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.0)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Principal {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Principal {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_id_display() {
        let id = PermissionId::from_static("overall.manage");
        assert_eq!(id.to_string(), "overall.manage");
        assert_eq!(format!("{:?}", id), "PermissionId(overall.manage)");
    }

    #[test]
    fn test_permission_id_owned_equals_static() {
        let owned = PermissionId::from(String::from("overall.read"));
        assert_eq!(owned, PermissionId::from_static("overall.read"));
    }

    #[test]
    fn test_permission_id_serde_transparent() {
        let id = PermissionId::from_static("overall.read");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"overall.read\"");
    }

    #[test]
    fn test_anonymous_groups() {
        let groups = Principal::ANONYMOUS.implicit_groups();
        assert_eq!(groups, [Principal::EVERYONE].as_slice());
    }

    #[test]
    fn test_user_groups() {
        let alice = Principal::from("alice");
        assert!(!alice.is_anonymous());
        assert!(alice.implicit_groups().contains(&Principal::AUTHENTICATED));
        assert!(alice.implicit_groups().contains(&Principal::EVERYONE));
    }
}
