//! The capability registry: every declared capability, frozen after startup.

use std::collections::HashMap;
use std::sync::Arc;

use tollgate_core::PermissionRegistry;

use crate::capability::{Capability, CapabilityId};
use crate::declare::{Component, Declarations};
use crate::error::{CapabilityError, Result};
use crate::form::Form;

/// Runs the registration pass over components.
#[derive(Debug)]
pub struct CapabilityRegistryBuilder {
    permissions: Arc<PermissionRegistry>,
    capabilities: HashMap<CapabilityId, Capability>,
    forms: HashMap<CapabilityId, Form>,
    components: Vec<String>,
}

impl CapabilityRegistryBuilder {
    /// Let `component` declare its capabilities.
    ///
    /// Fails without registering anything from `component` if any of its
    /// declarations is invalid or collides with an earlier component.
    pub fn component(mut self, component: &dyn Component) -> Result<Self> {
        let mut decl = Declarations::new(&self.permissions, component.name());
        component.declare(&mut decl)?;
        let (capabilities, forms) = decl.into_parts();

        if let Some(clash) = capabilities
            .iter()
            .find(|c| self.capabilities.contains_key(c.id()))
        {
            return Err(CapabilityError::DuplicateCapability(clash.id().clone()));
        }

        tracing::debug!(
            component = component.name(),
            capabilities = capabilities.len(),
            forms = forms.len(),
            "component declared"
        );

        for capability in capabilities {
            self.capabilities.insert(capability.id().clone(), capability);
        }
        for form in forms {
            self.forms.insert(form.id().clone(), form);
        }
        self.components.push(component.name().to_owned());
        Ok(self)
    }

    /// Freeze the declarations.
    pub fn build(self) -> CapabilityRegistry {
        CapabilityRegistry {
            permissions: self.permissions,
            capabilities: self.capabilities,
            forms: self.forms,
            components: self.components,
        }
    }
}

/// All declared capabilities and forms.
#[derive(Debug)]
pub struct CapabilityRegistry {
    permissions: Arc<PermissionRegistry>,
    capabilities: HashMap<CapabilityId, Capability>,
    forms: HashMap<CapabilityId, Form>,
    components: Vec<String>,
}

impl CapabilityRegistry {
    /// Start the registration pass against `permissions`.
    pub fn builder(permissions: Arc<PermissionRegistry>) -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder {
            permissions,
            capabilities: HashMap::new(),
            forms: HashMap::new(),
            components: Vec::new(),
        }
    }

    /// The permission registry requirements were resolved against.
    pub fn permissions(&self) -> &Arc<PermissionRegistry> {
        &self.permissions
    }

    /// Look up a capability.
    pub fn get(&self, id: &str) -> Option<&Capability> {
        self.capabilities.get(id)
    }

    /// Look up a capability, failing if nobody declared it.
    pub fn resolve(&self, id: &str) -> Result<&Capability> {
        self.get(id)
            .ok_or_else(|| CapabilityError::UnknownCapability(id.to_owned()))
    }

    /// Look up a form.
    pub fn form(&self, id: &str) -> Option<&Form> {
        self.forms.get(id)
    }

    /// Look up a form, failing if nobody declared it.
    pub fn resolve_form(&self, id: &str) -> Result<&Form> {
        self.form(id)
            .ok_or_else(|| CapabilityError::UnknownCapability(id.to_owned()))
    }

    /// Iterate over all capabilities, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.values()
    }

    /// Names of the components that declared, in registration order.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Number of declared capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
