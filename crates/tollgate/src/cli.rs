//! Gated CLI command dispatch.
//!
//! Every command names the capability it requires. The dispatcher authorizes
//! before the command runs and translates the outcome into an exit status,
//! keeping access denial distinguishable from domain failures.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use tollgate_capability::Capability;
use tollgate_core::Principal;

use crate::decision::Gated;
use crate::error::{Result, TollgateError};
use crate::gatekeeper::Gatekeeper;

/// Process exit status of a CLI command.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitStatus(i32);

impl ExitStatus {
    pub const SUCCESS: Self = Self(0);
    pub const FAILURE: Self = Self(1);
    pub const BAD_ARGUMENTS: Self = Self(2);
    pub const UNKNOWN_COMMAND: Self = Self(3);
    /// The caller lacks the permission the command requires.
    pub const ACCESS_DENIED: Self = Self(6);
    /// Some targets could not be processed because other plugins depend on them.
    pub const PARTIAL_FAILURE: Self = Self(16);
    pub const NO_SUCH_PLUGIN: Self = Self(17);

    /// The numeric code.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Returns `true` for [`ExitStatus::SUCCESS`].
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

impl fmt::Debug for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExitStatus({})", self.0)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command that ran but did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("bad arguments: {0}")]
    BadArguments(String),

    #[error("no such plugin: {0}")]
    NoSuchPlugin(String),

    /// Part of the work was refused for a domain reason.
    #[error("{0}")]
    Partial(String),

    #[error("{0}")]
    Failed(String),
}

impl CommandError {
    /// Exit status reported for this error.
    pub fn status(&self) -> ExitStatus {
        match self {
            Self::BadArguments(_) => ExitStatus::BAD_ARGUMENTS,
            Self::NoSuchPlugin(_) => ExitStatus::NO_SUCH_PLUGIN,
            Self::Partial(_) => ExitStatus::PARTIAL_FAILURE,
            Self::Failed(_) => ExitStatus::FAILURE,
        }
    }
}

/// A CLI command.
pub trait CliCommand: Send + Sync {
    /// Name the command is invoked by.
    fn name(&self) -> &str;

    /// Id of the declared capability the command requires.
    fn required(&self) -> &str;

    /// Run the command. Only called once the caller is authorized.
    fn run(&self, args: &[&str]) -> std::result::Result<(), CommandError>;
}

/// What an invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stderr: Option<String>,
}

impl CommandOutput {
    fn success() -> Self {
        Self {
            status: ExitStatus::SUCCESS,
            stderr: None,
        }
    }

    fn failure(status: ExitStatus, message: impl fmt::Display) -> Self {
        Self {
            status,
            stderr: Some(format!("ERROR: {message}")),
        }
    }
}

struct Registered {
    command: Box<dyn CliCommand>,
    capability: Capability,
}

/// Routes invocations to registered commands through the gatekeeper.
pub struct CliDispatcher {
    gatekeeper: Gatekeeper,
    commands: BTreeMap<String, Registered>,
}

impl CliDispatcher {
    /// Create a dispatcher with no commands.
    pub fn new(gatekeeper: Gatekeeper) -> Self {
        Self {
            gatekeeper,
            commands: BTreeMap::new(),
        }
    }

    /// Register `command`.
    ///
    /// Its required capability must already be declared.
    pub fn register(&mut self, command: impl CliCommand + 'static) -> Result<()> {
        let name = command.name().to_owned();
        if self.commands.contains_key(&name) {
            return Err(TollgateError::DuplicateCommand(name));
        }

        let capability = self
            .gatekeeper
            .context()
            .capabilities()
            .resolve(command.required())?
            .clone();

        tracing::debug!(command = %name, capability = %capability.id(), "CLI command registered");
        self.commands.insert(
            name,
            Registered {
                command: Box::new(command),
                capability,
            },
        );
        Ok(())
    }

    /// Register `command`, builder style.
    pub fn with(mut self, command: impl CliCommand + 'static) -> Result<Self> {
        self.register(command)?;
        Ok(self)
    }

    /// Names of the registered commands.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Invoke `name` as `principal`.
    pub fn invoke(&self, principal: &Principal, name: &str, args: &[&str]) -> CommandOutput {
        let Some(registered) = self.commands.get(name) else {
            return CommandOutput::failure(
                ExitStatus::UNKNOWN_COMMAND,
                format!("No such command {name}"),
            );
        };

        let outcome = self
            .gatekeeper
            .run_action(principal, &registered.capability, || registered.command.run(args));

        match outcome {
            Gated::Allowed(Ok(())) => CommandOutput::success(),
            Gated::Allowed(Err(err)) => {
                tracing::info!(%principal, command = name, error = %err, "CLI command failed");
                CommandOutput::failure(err.status(), err)
            }
            Gated::Denied(denial) => CommandOutput::failure(ExitStatus::ACCESS_DENIED, denial),
        }
    }
}

impl fmt::Debug for CliDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliDispatcher")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
