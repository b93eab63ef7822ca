//! Configuration forms: a page capability plus a table of field capabilities.
//!
//! The table is built once when the owning component registers and is read
//! by both the render path and the submit path.

use tollgate_core::PermissionHandle;

use crate::capability::{Capability, CapabilityId};

/// One field of a form and the capability guarding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    capability: Capability,
}

impl Field {
    pub(crate) fn new(name: String, capability: Capability) -> Self {
        Self { name, capability }
    }

    /// Field name as it appears in the form.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The capability guarding this field.
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// The permission required to see or change this field.
    pub fn required(&self) -> PermissionHandle {
        self.capability.required()
    }
}

/// A configuration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    page: Capability,
    fields: Vec<Field>,
}

impl Form {
    pub(crate) fn new(page: Capability, fields: Vec<Field>) -> Self {
        Self { page, fields }
    }

    /// The form id, shared with its page capability.
    pub fn id(&self) -> &CapabilityId {
        self.page.id()
    }

    /// The capability guarding the whole form.
    pub fn page(&self) -> &Capability {
        &self.page
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}
