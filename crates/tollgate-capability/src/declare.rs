//! The registration pass: components declare their capabilities.
//!
//! Each component implements [`Component`] and is handed a
//! [`Declarations`] recorder once, at startup. Nothing is discovered by
//! inspection; whatever a component does not declare does not exist.
//!
//! Every declaration defaults to the registry's broadest permission. An
//! author opts a specific action, page or field into a narrower tier with the
//! `*_requiring` variants.

use tollgate_core::{PermissionHandle, PermissionRegistry};

use crate::capability::{Capability, CapabilityId, CapabilityKind};
use crate::error::{CapabilityError, Result};
use crate::form::{Field, Form};

/// An extension component that owns protected capabilities.
pub trait Component {
    /// Component name, used in diagnostics.
    fn name(&self) -> &str;

    /// Declare every capability this component exposes.
    fn declare(&self, decl: &mut Declarations<'_>) -> Result<()>;
}

/// Records the capabilities of one component.
#[derive(Debug)]
pub struct Declarations<'r> {
    registry: &'r PermissionRegistry,
    component: String,
    capabilities: Vec<Capability>,
    forms: Vec<Form>,
}

impl<'r> Declarations<'r> {
    pub(crate) fn new(registry: &'r PermissionRegistry, component: &str) -> Self {
        Self {
            registry,
            component: component.to_owned(),
            capabilities: Vec::new(),
            forms: Vec::new(),
        }
    }

    /// Name of the component being declared.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// The permission registry requirements are resolved against.
    pub fn registry(&self) -> &'r PermissionRegistry {
        self.registry
    }

    /// Declare an action requiring the broadest permission.
    pub fn action(&mut self, id: impl Into<CapabilityId>) -> Result<Capability> {
        self.declare(id.into(), CapabilityKind::Action, None)
    }

    /// Declare an action requiring `permission`.
    pub fn action_requiring(
        &mut self,
        id: impl Into<CapabilityId>,
        permission: &str,
    ) -> Result<Capability> {
        self.declare(id.into(), CapabilityKind::Action, Some(permission))
    }

    /// Declare a page requiring the broadest permission.
    pub fn page(&mut self, id: impl Into<CapabilityId>) -> Result<Capability> {
        self.declare(id.into(), CapabilityKind::Page, None)
    }

    /// Declare a page requiring `permission`.
    pub fn page_requiring(
        &mut self,
        id: impl Into<CapabilityId>,
        permission: &str,
    ) -> Result<Capability> {
        self.declare(id.into(), CapabilityKind::Page, Some(permission))
    }

    /// Start a form whose page requires the broadest permission.
    pub fn form(&mut self, id: impl Into<CapabilityId>) -> Result<FormBuilder<'_, 'r>> {
        let page = self.declare(id.into(), CapabilityKind::Page, None)?;
        Ok(FormBuilder::new(self, page))
    }

    /// Start a form whose page requires `permission`.
    pub fn form_requiring(
        &mut self,
        id: impl Into<CapabilityId>,
        permission: &str,
    ) -> Result<FormBuilder<'_, 'r>> {
        let page = self.declare(id.into(), CapabilityKind::Page, Some(permission))?;
        Ok(FormBuilder::new(self, page))
    }

    fn requirement(&self, permission: Option<&str>) -> Result<PermissionHandle> {
        match permission {
            Some(id) => Ok(self.registry.resolve(id)?),
            None => Ok(self.registry.broadest()),
        }
    }

    fn declare(
        &mut self,
        id: CapabilityId,
        kind: CapabilityKind,
        permission: Option<&str>,
    ) -> Result<Capability> {
        if self.capabilities.iter().any(|c| *c.id() == id) {
            return Err(CapabilityError::DuplicateCapability(id));
        }
        let required = self.requirement(permission)?;
        let capability = Capability::new(id, kind, required, self.component.clone());
        self.capabilities.push(capability.clone());
        Ok(capability)
    }

    pub(crate) fn into_parts(self) -> (Vec<Capability>, Vec<Form>) {
        (self.capabilities, self.forms)
    }
}

/// Builds the field table of one form.
#[derive(Debug)]
#[must_use = "a form is only registered once `finish` is called"]
pub struct FormBuilder<'d, 'r> {
    decl: &'d mut Declarations<'r>,
    page: Capability,
    fields: Vec<Field>,
}

impl<'d, 'r> FormBuilder<'d, 'r> {
    fn new(decl: &'d mut Declarations<'r>, page: Capability) -> Self {
        Self {
            decl,
            page,
            fields: Vec::new(),
        }
    }

    /// Add a field requiring the broadest permission.
    pub fn field(self, name: &str) -> Result<Self> {
        self.add(name, None)
    }

    /// Add a field relaxed to `permission`.
    pub fn field_requiring(self, name: &str, permission: &str) -> Result<Self> {
        self.add(name, Some(permission))
    }

    fn add(mut self, name: &str, permission: Option<&str>) -> Result<Self> {
        if self.fields.iter().any(|field| field.name() == name) {
            return Err(CapabilityError::DuplicateField {
                form: self.page.id().clone(),
                field: name.to_owned(),
            });
        }
        let id = CapabilityId::field(self.page.id(), name);
        let capability = self.decl.declare(id, CapabilityKind::Field, permission)?;
        self.fields.push(Field::new(name.to_owned(), capability));
        Ok(self)
    }

    /// Register the form.
    pub fn finish(self) -> Result<()> {
        self.decl.forms.push(Form::new(self.page, self.fields));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::{catalog, standard_registry};

    #[test]
    fn test_default_is_broadest() {
        let (registry, perms) = standard_registry().unwrap();
        let mut decl = Declarations::new(&registry, "plugins");

        let install = decl.action("plugin.install").unwrap();
        assert_eq!(install.required(), perms.administer);
        assert_eq!(install.kind(), CapabilityKind::Action);
        assert_eq!(install.component(), "plugins");
    }

    #[test]
    fn test_explicit_relaxation() {
        let (registry, perms) = standard_registry().unwrap();
        let mut decl = Declarations::new(&registry, "labels");

        let page = decl.page_requiring("label.configure", catalog::MANAGE).unwrap();
        assert_eq!(page.required(), perms.manage);
    }

    #[test]
    fn test_unknown_permission_fails_fast() {
        let (registry, _) = standard_registry().unwrap();
        let mut decl = Declarations::new(&registry, "x");

        let err = decl.action_requiring("x.do", "overall.fly").unwrap_err();
        assert!(matches!(err, CapabilityError::Core(_)));
    }

    #[test]
    fn test_form_fields_default_independently() {
        let (registry, perms) = standard_registry().unwrap();
        let mut decl = Declarations::new(&registry, "global");

        decl.form_requiring("configure", catalog::MANAGE)
            .unwrap()
            .field("numExecutors")
            .unwrap()
            .field_requiring("systemMessage", catalog::MANAGE)
            .unwrap()
            .finish()
            .unwrap();

        let (capabilities, forms) = decl.into_parts();
        assert_eq!(capabilities.len(), 3);

        let form = &forms[0];
        assert_eq!(form.page().required(), perms.manage);
        assert_eq!(form.field("numExecutors").unwrap().required(), perms.administer);
        assert_eq!(form.field("systemMessage").unwrap().required(), perms.manage);
        assert_eq!(
            form.field("systemMessage").unwrap().capability().id().as_str(),
            "configure/systemMessage"
        );
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let (registry, _) = standard_registry().unwrap();
        let mut decl = Declarations::new(&registry, "global");

        let err = decl
            .form("configure")
            .unwrap()
            .field("shell")
            .unwrap()
            .field("shell")
            .unwrap_err();
        assert!(matches!(err, CapabilityError::DuplicateField { .. }));
    }

    #[test]
    fn test_relaxation_conditional_on_registry() {
        fn declare_quiet_period(decl: &mut Declarations<'_>) -> Result<Capability> {
            match decl.registry().handle(catalog::MANAGE) {
                Some(_) => decl.action_requiring("quietPeriod.set", catalog::MANAGE),
                None => decl.action("quietPeriod.set"),
            }
        }

        let (registry, perms) = standard_registry().unwrap();
        let mut decl = Declarations::new(&registry, "global");
        assert_eq!(declare_quiet_period(&mut decl).unwrap().required(), perms.manage);

        let mut builder = PermissionRegistry::builder();
        let root = builder
            .register(tollgate_core::PermissionSpec::new(catalog::ADMINISTER, "Overall"))
            .unwrap();
        let bare = builder.build().unwrap();
        let mut decl = Declarations::new(&bare, "global");
        assert_eq!(declare_quiet_period(&mut decl).unwrap().required(), root);
    }

    #[test]
    fn test_duplicate_capability_rejected() {
        let (registry, _) = standard_registry().unwrap();
        let mut decl = Declarations::new(&registry, "plugins");

        decl.action("plugin.install").unwrap();
        let err = decl.action("plugin.install").unwrap_err();
        assert!(matches!(err, CapabilityError::DuplicateCapability(_)));
    }
}
