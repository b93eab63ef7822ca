//! Plugin administration commands.
//!
//! Installing or disabling a plugin changes what code the server runs, so
//! both stay at the broadest permission even when the manage tier is
//! active.

use std::sync::Arc;

use thiserror::Error;

use tollgate_capability::{Component, Declarations};

use crate::cli::{CliCommand, CommandError};

/// Capability guarding plugin installation.
pub const INSTALL_PLUGIN: &str = "plugin.install";

/// Capability guarding plugin disablement.
pub const DISABLE_PLUGIN: &str = "plugin.disable";

/// Failures reported by a [`PluginManager`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("no such plugin: {0}")]
    NotFound(String),

    #[error("plugin {plugin} is required by {}", dependents.join(", "))]
    HasDependents {
        plugin: String,
        dependents: Vec<String>,
    },

    #[error("plugin operation failed: {0}")]
    Failed(String),
}

/// The plugin subsystem. Its side effects are only reached through
/// authorized commands.
pub trait PluginManager: Send + Sync {
    /// Install `plugin` from the update center.
    fn install(&self, plugin: &str) -> Result<(), PluginError>;

    /// Disable `plugin`. Fails if enabled plugins depend on it.
    fn disable(&self, plugin: &str) -> Result<(), PluginError>;

    /// Whether `plugin` is installed and enabled.
    fn is_enabled(&self, plugin: &str) -> bool;
}

/// Declares the plugin administration capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginCommands;

impl Component for PluginCommands {
    fn name(&self) -> &str {
        "plugin-commands"
    }

    fn declare(&self, decl: &mut Declarations<'_>) -> tollgate_capability::Result<()> {
        decl.action(INSTALL_PLUGIN)?;
        decl.action(DISABLE_PLUGIN)?;
        Ok(())
    }
}

/// `install-plugin SOURCE...`
pub struct InstallPluginCommand {
    plugins: Arc<dyn PluginManager>,
}

impl InstallPluginCommand {
    pub fn new(plugins: Arc<dyn PluginManager>) -> Self {
        Self { plugins }
    }
}

impl CliCommand for InstallPluginCommand {
    fn name(&self) -> &str {
        "install-plugin"
    }

    fn required(&self) -> &str {
        INSTALL_PLUGIN
    }

    fn run(&self, args: &[&str]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::BadArguments("expected at least one plugin".into()));
        }

        let mut outcome = Outcome::default();
        for plugin in args {
            match self.plugins.install(plugin) {
                Ok(()) => tracing::info!(plugin, "plugin installed"),
                Err(err) => outcome.record(err),
            }
        }
        outcome.finish()
    }
}

/// `disable-plugin NAME...`
///
/// Disables as many of the named plugins as possible. A plugin other
/// enabled plugins depend on is skipped and reported as a partial failure.
/// An unknown name does not stop the remaining names from being processed.
pub struct DisablePluginCommand {
    plugins: Arc<dyn PluginManager>,
}

impl DisablePluginCommand {
    pub fn new(plugins: Arc<dyn PluginManager>) -> Self {
        Self { plugins }
    }
}

impl CliCommand for DisablePluginCommand {
    fn name(&self) -> &str {
        "disable-plugin"
    }

    fn required(&self) -> &str {
        DISABLE_PLUGIN
    }

    fn run(&self, args: &[&str]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::BadArguments("expected at least one plugin".into()));
        }

        let mut outcome = Outcome::default();
        for plugin in args {
            match self.plugins.disable(plugin) {
                Ok(()) => tracing::info!(plugin, "plugin disabled"),
                Err(err) => outcome.record(err),
            }
        }
        outcome.finish()
    }
}

/// Per-name failures of a multi-plugin command.
///
/// Every name is attempted; the reported error is the most severe one seen.
/// Unknown plugins rank above plain failures, which rank above plugins
/// skipped because of dependents.
#[derive(Debug, Default)]
struct Outcome {
    missing: Vec<String>,
    failed: Vec<String>,
    blocked: Vec<String>,
}

impl Outcome {
    fn record(&mut self, err: PluginError) {
        tracing::warn!(error = %err, "plugin operation skipped");
        match err {
            PluginError::NotFound(name) => self.missing.push(name),
            err @ PluginError::HasDependents { .. } => self.blocked.push(err.to_string()),
            err => self.failed.push(err.to_string()),
        }
    }

    fn finish(self) -> Result<(), CommandError> {
        if !self.missing.is_empty() {
            Err(CommandError::NoSuchPlugin(self.missing.join(", ")))
        } else if !self.failed.is_empty() {
            Err(CommandError::Failed(self.failed.join("; ")))
        } else if !self.blocked.is_empty() {
            Err(CommandError::Partial(self.blocked.join("; ")))
        } else {
            Ok(())
        }
    }
}
