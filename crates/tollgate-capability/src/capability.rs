//! Capabilities: protected actions, pages and fields.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;

use tollgate_core::PermissionHandle;

/// Stable identifier of a capability.
///
/// Actions and pages use their own name (`"plugin.install"`, `"configure"`).
/// Fields are namespaced by their form: `"configure/numExecutors"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(Cow<'static, str>);

impl CapabilityId {
    /// Create an identifier from any string.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// Identifier of field `name` in form `form`.
    pub fn field(form: &CapabilityId, name: &str) -> Self {
        Self(Cow::Owned(format!("{}/{}", form.0, name)))
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityId({})", self.0)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for CapabilityId {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

impl From<String> for CapabilityId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl Borrow<str> for CapabilityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// What a capability protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityKind {
    /// A command or endpoint with side effects.
    Action,

    /// A page or form as a whole.
    Page,

    /// One field of a configuration form.
    Field,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Action => "action",
            Self::Page => "page",
            Self::Field => "field",
        })
    }
}

/// A protected action, page or field and the permission it requires.
///
/// Immutable once declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    id: CapabilityId,
    kind: CapabilityKind,
    required: PermissionHandle,
    component: String,
}

impl Capability {
    pub(crate) fn new(
        id: CapabilityId,
        kind: CapabilityKind,
        required: PermissionHandle,
        component: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            required,
            component: component.into(),
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &CapabilityId {
        &self.id
    }

    /// What is protected.
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// The minimum permission needed to see or use this capability.
    pub fn required(&self) -> PermissionHandle {
        self.required
    }

    /// Name of the component that declared it.
    pub fn component(&self) -> &str {
        &self.component
    }
}
