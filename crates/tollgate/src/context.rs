//! The process-wide security context.
//!
//! One [`SecurityContext`] is built at startup and passed explicitly to the
//! [`Gatekeeper`](crate::Gatekeeper). Its lifecycle is init once, read many,
//! write rarely:
//!
//! 1. Register the permission catalog (standard tiers plus extras).
//! 2. Apply the boot configuration, activating the manage tier if asked.
//! 3. Run the component registration pass.
//! 4. Load the persisted grants.
//!
//! After that only two mutations exist, both administrative: replacing the
//! grant set and toggling a permission's enablement.

use std::sync::Arc;

use tollgate_capability::{CapabilityRegistry, Component};
use tollgate_core::{PermissionRegistry, PermissionSpec, StandardPermissions};
use tollgate_grants::{GrantConfig, GrantSet, GrantStore, GroupResolver, NoGroups};

use crate::config::TollgateConfig;
use crate::error::Result;

/// Everything the gatekeeper consults.
pub struct SecurityContext {
    permissions: Arc<PermissionRegistry>,
    standard: StandardPermissions,
    grants: GrantStore,
    capabilities: CapabilityRegistry,
    config: TollgateConfig,
}

impl SecurityContext {
    /// Start building a context.
    pub fn builder(config: TollgateConfig) -> SecurityContextBuilder {
        SecurityContextBuilder {
            config,
            permissions: Vec::new(),
            components: Vec::new(),
            groups: Arc::new(NoGroups),
            grants: GrantConfig::default(),
        }
    }

    /// The permission registry.
    pub fn permissions(&self) -> &PermissionRegistry {
        &self.permissions
    }

    /// Handles of the standard permissions.
    pub fn standard(&self) -> StandardPermissions {
        self.standard
    }

    /// The grant store.
    pub fn grants(&self) -> &GrantStore {
        &self.grants
    }

    /// The declared capabilities.
    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    /// The configuration the context was built with.
    pub fn config(&self) -> &TollgateConfig {
        &self.config
    }

    /// Swap in a new authorization strategy.
    pub fn replace_grants(&self, grants: GrantSet) -> Result<Arc<GrantSet>> {
        Ok(self.grants.replace(grants)?)
    }

    /// Swap in a persisted authorization strategy.
    pub fn reload_grants(&self, config: &GrantConfig) -> Result<Arc<GrantSet>> {
        let grants = config.resolve(&self.permissions)?;
        self.replace_grants(grants)
    }

    /// Enable or disable a permission process-wide. Returns the previous value.
    pub fn set_enabled(&self, permission: &str, enabled: bool) -> Result<bool> {
        let handle = self.permissions.resolve(permission)?;
        Ok(self.permissions.set_enabled(handle, enabled)?)
    }
}

impl std::fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContext")
            .field("permissions", &self.permissions.len())
            .field("capabilities", &self.capabilities.len())
            .field("grants", &self.grants)
            .field("config", &self.config)
            .finish()
    }
}

/// Assembles a [`SecurityContext`] in startup order.
pub struct SecurityContextBuilder {
    config: TollgateConfig,
    permissions: Vec<PermissionSpec>,
    components: Vec<Box<dyn Component>>,
    groups: Arc<dyn GroupResolver>,
    grants: GrantConfig,
}

impl SecurityContextBuilder {
    /// Register a permission beyond the standard catalog.
    pub fn permission(mut self, spec: PermissionSpec) -> Self {
        self.permissions.push(spec);
        self
    }

    /// Add a component to the registration pass.
    pub fn component(mut self, component: impl Component + 'static) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Resolve group membership through `groups`.
    pub fn groups(mut self, groups: Arc<dyn GroupResolver>) -> Self {
        self.groups = groups;
        self
    }

    /// Initial grants, as persisted.
    pub fn grants(mut self, grants: GrantConfig) -> Self {
        self.grants = grants;
        self
    }

    /// Build the context. Any error here is fatal for startup.
    pub fn build(self) -> Result<SecurityContext> {
        let mut registry = PermissionRegistry::builder();
        let standard = StandardPermissions::register(&mut registry)?;
        for spec in self.permissions {
            registry.register(spec)?;
        }
        let permissions = Arc::new(registry.build()?);

        if self.config.manage_permission {
            permissions.set_enabled(standard.manage, true)?;
        }

        let mut capabilities = CapabilityRegistry::builder(Arc::clone(&permissions));
        for component in &self.components {
            capabilities = capabilities.component(component.as_ref())?;
        }
        let capabilities = capabilities.build();

        let grant_set = self.grants.resolve(&permissions)?;
        let grants = GrantStore::with_groups(Arc::clone(&permissions), grant_set, self.groups)?;

        tracing::info!(
            permissions = permissions.len(),
            capabilities = capabilities.len(),
            components = capabilities.components().len(),
            manage_permission = self.config.manage_permission,
            "security context ready"
        );

        Ok(SecurityContext {
            permissions,
            standard,
            grants,
            capabilities,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_capability::Declarations;
    use tollgate_core::{catalog, Principal};
    use tollgate_grants::{GrantEntry, StaticGroups};

    use crate::gatekeeper::Gatekeeper;

    struct Labels;

    impl Component for Labels {
        fn name(&self) -> &str {
            "labels"
        }

        fn declare(&self, decl: &mut Declarations<'_>) -> tollgate_capability::Result<()> {
            decl.form_requiring("label.configure", catalog::MANAGE)?
                .field_requiring("description", catalog::MANAGE)?
                .finish()
        }
    }

    fn grants() -> GrantConfig {
        GrantConfig {
            grants: vec![GrantEntry {
                principal: Principal::from("manager"),
                permissions: vec![catalog::MANAGE.into()],
            }],
        }
    }

    #[test]
    fn test_boot_flag_enables_manage() {
        let context = SecurityContext::builder(TollgateConfig::default().with_manage_permission(true))
            .grants(grants())
            .build()
            .unwrap();

        let manage = context.standard().manage;
        assert!(context.permissions().is_enabled(manage));
        assert!(context.grants().holds(&Principal::from("manager"), manage));
    }

    #[test]
    fn test_absent_flag_keeps_manage_dormant() {
        let context = SecurityContext::builder(TollgateConfig::default())
            .grants(grants())
            .build()
            .unwrap();

        let manage = context.standard().manage;
        assert!(!context.permissions().is_enabled(manage));
        assert!(!context.grants().holds(&Principal::from("manager"), manage));
    }

    #[test]
    fn test_components_and_extra_permissions() {
        let context = SecurityContext::builder(TollgateConfig::default())
            .permission(PermissionSpec::new("computer.configure", "Agent").implied_by(catalog::ADMINISTER))
            .component(Labels)
            .build()
            .unwrap();

        assert!(context.permissions().handle("computer.configure").is_some());
        assert!(context.capabilities().form("label.configure").is_some());
    }

    #[test]
    fn test_reload_grants() {
        let context = SecurityContext::builder(TollgateConfig::default().with_manage_permission(true))
            .build()
            .unwrap();
        let manager = Principal::from("manager");
        let manage = context.standard().manage;

        assert!(!context.grants().holds(&manager, manage));
        context.reload_grants(&grants()).unwrap();
        assert!(context.grants().holds(&manager, manage));
    }

    #[test]
    fn test_group_membership_confers_grants() {
        let groups = StaticGroups::new().with("alice", "ops");
        let context = SecurityContext::builder(TollgateConfig::default().with_manage_permission(true))
            .component(Labels)
            .groups(Arc::new(groups))
            .grants(GrantConfig {
                grants: vec![GrantEntry {
                    principal: Principal::from("ops"),
                    permissions: vec![catalog::MANAGE.into()],
                }],
            })
            .build()
            .unwrap();
        let gatekeeper = Gatekeeper::new(Arc::new(context));

        let alice = gatekeeper
            .authorize_id(&Principal::from("alice"), "label.configure")
            .unwrap();
        let bob = gatekeeper
            .authorize_id(&Principal::from("bob"), "label.configure")
            .unwrap();
        assert!(alice.is_allowed());
        assert!(bob.is_denied());
    }

    #[test]
    fn test_set_enabled_by_id() {
        let context = SecurityContext::builder(TollgateConfig::default()).build().unwrap();

        assert!(!context.set_enabled(catalog::MANAGE, true).unwrap());
        assert!(context.set_enabled("overall.fly", true).is_err());
    }
}
