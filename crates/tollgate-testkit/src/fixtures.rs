//! Test fixtures and helpers.
//!
//! A small management application wired through Tollgate: the global
//! configuration form, a label configuration form, a diagnostic export
//! action and the plugin commands, backed by in-memory collaborators.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::{json, Value};

use tollgate::capability::{CapabilityId, Component, Declarations, Form};
use tollgate::core::{catalog, Principal, StandardPermissions};
use tollgate::grants::GrantSet;
use tollgate::{
    CliDispatcher, ConfigStore, ConfigValues, DisablePluginCommand, Gated, Gatekeeper,
    InstallPluginCommand, PluginCommands, PluginError, PluginManager, RenderedForm,
    SecurityContext, Submission, SubmitReport, TollgateConfig,
};

/// The global configuration page.
pub const CONFIGURE: &str = "configure";

/// The label configuration page.
pub const LABEL_CONFIGURE: &str = "label.configure";

/// Diagnostic dump of the agent channel export table.
pub const DUMP_EXPORT_TABLE: &str = "computer.dumpExportTable";

/// Global configuration. The page is open to managers; executor count,
/// shell, global properties and administrative monitors stay with
/// administrators.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalConfiguration;

impl Component for GlobalConfiguration {
    fn name(&self) -> &str {
        "global-configuration"
    }

    fn declare(&self, decl: &mut Declarations<'_>) -> tollgate::capability::Result<()> {
        decl.form_requiring(CONFIGURE, catalog::MANAGE)?
            .field("numExecutors")?
            .field("shell")?
            .field("globalProperties")?
            .field("administrativeMonitors")?
            .field_requiring("systemMessage", catalog::MANAGE)?
            .field_requiring("quietPeriod", catalog::MANAGE)?
            .finish()
    }
}

/// Per-label configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelConfiguration;

impl Component for LabelConfiguration {
    fn name(&self) -> &str {
        "label-configuration"
    }

    fn declare(&self, decl: &mut Declarations<'_>) -> tollgate::capability::Result<()> {
        decl.form_requiring(LABEL_CONFIGURE, catalog::MANAGE)?
            .field_requiring("description", catalog::MANAGE)?
            .finish()
    }
}

/// Agent diagnostics. Left at the default requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputerDiagnostics;

impl Component for ComputerDiagnostics {
    fn name(&self) -> &str {
        "computer"
    }

    fn declare(&self, decl: &mut Declarations<'_>) -> tollgate::capability::Result<()> {
        decl.action(DUMP_EXPORT_TABLE)?;
        Ok(())
    }
}

/// Form values held in memory.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    forms: RwLock<BTreeMap<CapabilityId, ConfigValues>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a stored value directly, bypassing authorization.
    pub fn seed(&self, form: &str, field: &str, value: impl Into<Value>) {
        self.forms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(CapabilityId::new(form.to_owned()))
            .or_default()
            .insert(field.to_owned(), value.into());
    }

    /// The stored value of one field.
    pub fn get(&self, form: &str, field: &str) -> Option<Value> {
        self.forms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(form)
            .and_then(|values| values.get(field).cloned())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self, form: &CapabilityId) -> tollgate::Result<ConfigValues> {
        let forms = self.forms.read().unwrap_or_else(PoisonError::into_inner);
        Ok(forms.get(form).cloned().unwrap_or_default())
    }

    fn persist(&self, form: &CapabilityId, changes: ConfigValues) -> tollgate::Result<()> {
        self.forms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(form.clone())
            .or_default()
            .extend(changes);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PluginState {
    enabled: bool,
    dependencies: Vec<String>,
}

/// Installed plugins held in memory, with an update center of installable
/// names.
#[derive(Debug, Default)]
pub struct MemoryPluginManager {
    installed: Mutex<BTreeMap<String, PluginState>>,
    update_center: BTreeSet<String>,
}

impl MemoryPluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an installed, enabled plugin.
    pub fn with_plugin(self, name: &str, dependencies: &[&str]) -> Self {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                name.to_owned(),
                PluginState {
                    enabled: true,
                    dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
                },
            );
        self
    }

    /// Make `name` installable.
    pub fn with_available(mut self, name: &str) -> Self {
        self.update_center.insert(name.to_owned());
        self
    }

    /// Whether `name` is installed at all.
    pub fn is_installed(&self, name: &str) -> bool {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

impl PluginManager for MemoryPluginManager {
    fn install(&self, plugin: &str) -> Result<(), PluginError> {
        if !self.update_center.contains(plugin) {
            return Err(PluginError::NotFound(plugin.to_owned()));
        }
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(plugin.to_owned())
            .or_insert(PluginState {
                enabled: true,
                dependencies: Vec::new(),
            });
        Ok(())
    }

    fn disable(&self, plugin: &str) -> Result<(), PluginError> {
        let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if !installed.contains_key(plugin) {
            return Err(PluginError::NotFound(plugin.to_owned()));
        }

        let dependents: Vec<String> = installed
            .iter()
            .filter(|(_, state)| state.enabled && state.dependencies.iter().any(|d| d == plugin))
            .map(|(name, _)| name.clone())
            .collect();
        if !dependents.is_empty() {
            return Err(PluginError::HasDependents {
                plugin: plugin.to_owned(),
                dependents,
            });
        }

        if let Some(state) = installed.get_mut(plugin) {
            state.enabled = false;
        }
        Ok(())
    }

    fn is_enabled(&self, plugin: &str) -> bool {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(plugin)
            .is_some_and(|state| state.enabled)
    }
}

/// The whole application under test.
pub struct Scenario {
    pub gatekeeper: Gatekeeper,
    pub config: Arc<MemoryConfigStore>,
    pub plugins: Arc<MemoryPluginManager>,
    pub cli: CliDispatcher,
}

impl Scenario {
    /// The application with the manage tier active.
    pub fn new() -> tollgate::Result<Self> {
        Self::with_config(TollgateConfig::default().with_manage_permission(true))
    }

    /// The application with an explicit boot configuration.
    pub fn with_config(config: TollgateConfig) -> tollgate::Result<Self> {
        let context = SecurityContext::builder(config)
            .component(GlobalConfiguration)
            .component(LabelConfiguration)
            .component(ComputerDiagnostics)
            .component(PluginCommands)
            .build()?;
        let gatekeeper = Gatekeeper::new(Arc::new(context));

        let store = MemoryConfigStore::new();
        store.seed(CONFIGURE, "numExecutors", 2);
        store.seed(CONFIGURE, "shell", "/bin/sh");
        store.seed(CONFIGURE, "globalProperties", json!({}));
        store.seed(CONFIGURE, "administrativeMonitors", json!([]));
        store.seed(CONFIGURE, "systemMessage", "");
        store.seed(CONFIGURE, "quietPeriod", 5);
        let config = Arc::new(store);

        let plugins = Arc::new(
            MemoryPluginManager::new()
                .with_plugin("dependee", &[])
                .with_plugin("depender", &["dependee"])
                .with_available("git"),
        );

        let cli = CliDispatcher::new(gatekeeper.clone())
            .with(InstallPluginCommand::new(plugins.clone()))?
            .with(DisablePluginCommand::new(plugins.clone()))?;

        Ok(Self {
            gatekeeper,
            config,
            plugins,
            cli,
        })
    }

    /// Handles of the standard permissions.
    pub fn perms(&self) -> StandardPermissions {
        self.gatekeeper.context().standard()
    }

    /// Install the grant set built by `grants`.
    pub fn grant(&self, grants: impl FnOnce(StandardPermissions) -> GrantSet) -> tollgate::Result<()> {
        let context = self.gatekeeper.context();
        context.replace_grants(grants(context.standard()))?;
        Ok(())
    }

    /// A declared form.
    pub fn form(&self, id: &str) -> tollgate::Result<Form> {
        Ok(self.gatekeeper.context().capabilities().resolve_form(id)?.clone())
    }

    /// Render `form` for `principal`.
    pub fn render(&self, principal: &Principal, form: &str) -> tollgate::Result<Gated<RenderedForm>> {
        let form = self.form(form)?;
        self.gatekeeper.render_form(principal, &form, self.config.as_ref())
    }

    /// Submit `submission` to `form` as `principal`.
    pub fn submit(
        &self,
        principal: &Principal,
        form: &str,
        submission: &Submission,
    ) -> tollgate::Result<Gated<SubmitReport>> {
        let form = self.form(form)?;
        self.gatekeeper
            .submit_form(principal, &form, submission, self.config.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_declares_everything() {
        let scenario = Scenario::new().unwrap();
        let capabilities = scenario.gatekeeper.context().capabilities();

        assert!(capabilities.form(CONFIGURE).is_some());
        assert!(capabilities.form(LABEL_CONFIGURE).is_some());
        assert!(capabilities.get(DUMP_EXPORT_TABLE).is_some());
        assert!(capabilities.get(tollgate::INSTALL_PLUGIN).is_some());
        assert_eq!(
            scenario.cli.commands().collect::<Vec<_>>(),
            vec!["disable-plugin", "install-plugin"]
        );
    }

    #[test]
    fn test_memory_plugin_manager_dependents() {
        let plugins = MemoryPluginManager::new()
            .with_plugin("dependee", &[])
            .with_plugin("depender", &["dependee"]);

        assert!(matches!(
            plugins.disable("dependee"),
            Err(PluginError::HasDependents { .. })
        ));
        plugins.disable("depender").unwrap();
        plugins.disable("dependee").unwrap();
        assert!(!plugins.is_enabled("dependee"));
        assert!(plugins.is_installed("dependee"));
    }

    #[test]
    fn test_memory_config_store_merges() {
        let store = MemoryConfigStore::new();
        store.seed(CONFIGURE, "shell", "/bin/sh");

        let mut changes = ConfigValues::new();
        changes.insert("quietPeriod".into(), json!(10));
        store.persist(&CapabilityId::from(CONFIGURE), changes).unwrap();

        assert_eq!(store.get(CONFIGURE, "shell"), Some(json!("/bin/sh")));
        assert_eq!(store.get(CONFIGURE, "quietPeriod"), Some(json!(10)));
    }
}
