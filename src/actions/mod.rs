// src/actions/mod.rs

pub mod command;
pub mod fs;
pub mod method;
#[cfg(windows)]
pub mod package;
#[cfg(windows)]
pub mod process;
#[cfg(windows)]
pub mod registry;

use std::{fmt, path::Path, sync::Arc};

use method::ActionExecutor;

use crate::errors::ActionError;
#[cfg(windows)]
use crate::utils::registry::RegistryValue;

/// How the runner treats a failure of this action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPolicy {
    /// Failure aborts the remainder of the plan.
    Required,
    /// Failure is recorded and the plan continues.
    BestEffort,
}

/// A single declarative unit of system mutation.
///
/// Fully self-describing: the executor owns the target and desired state,
/// the policy decides what its failure means to the surrounding plan.
#[derive(Clone)]
pub struct Action {
    name: String,
    policy: ActionPolicy,
    executor: Arc<dyn ActionExecutor>,
}

impl Action {
    pub fn new(
        name: impl Into<String>,
        policy: ActionPolicy,
        executor: Arc<dyn ActionExecutor>,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            executor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> ActionPolicy {
        self.policy
    }

    pub fn is_satisfied(&self) -> Result<bool, ActionError> {
        self.executor.is_satisfied()
    }

    pub fn apply(&self) -> Result<(), ActionError> {
        self.executor.apply()
    }

    /// Ensure a named registry value holds `value`, creating intermediate
    /// keys as needed.
    #[cfg(windows)]
    pub fn set_registry_value(
        policy: ActionPolicy,
        path: &str,
        value_name: &str,
        value: RegistryValue,
    ) -> Self {
        Self::new(
            format!("set {}\\{}", path, value_name),
            policy,
            Arc::new(registry::RegistryValueAction::new(path, value_name, value)),
        )
    }

    /// Ensure a registry key (and everything under it) is gone.
    #[cfg(windows)]
    pub fn delete_registry_key(policy: ActionPolicy, path: &str) -> Self {
        Self::new(
            format!("delete key {}", path),
            policy,
            Arc::new(registry::DeleteRegistryKeyAction::new(path)),
        )
    }

    /// Ensure no running process matches `pattern` (case-insensitive image
    /// name, optional leading/trailing `*`).
    #[cfg(windows)]
    pub fn stop_process(policy: ActionPolicy, pattern: &str) -> Self {
        Self::new(
            format!("stop process '{}'", pattern),
            policy,
            Arc::new(process::StopProcessAction::new(pattern)),
        )
    }

    /// Ensure no installed AppX package matches `pattern` for any user
    /// profile.
    #[cfg(windows)]
    pub fn remove_package(policy: ActionPolicy, pattern: &str) -> Self {
        Self::new(
            format!("remove package '{}'", pattern),
            policy,
            Arc::new(package::RemovePackageAction::new(pattern)),
        )
    }

    /// Ensure a file or directory tree is gone.
    pub fn delete_path(policy: ActionPolicy, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(
            format!("delete path '{}'", path.display()),
            policy,
            Arc::new(fs::DeletePathAction::new(path)),
        )
    }

    /// Ensure a directory (and its parents) exists.
    pub fn ensure_directory(policy: ActionPolicy, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(
            format!("ensure directory '{}'", path.display()),
            policy,
            Arc::new(fs::EnsureDirectoryAction::new(path)),
        )
    }

    /// Run an external command and wait for it, failing on a non-zero exit
    /// code. Never reports itself satisfied.
    pub fn run_command(policy: ActionPolicy, program: &str, args: &[&str]) -> Self {
        let executor = command::ExternalCommandAction::new(program, args, false);
        Self::new(format!("run {}", executor.display_line()), policy, Arc::new(executor))
    }

    /// Launch an external command and leave it running. Reports applied as
    /// soon as the child has spawned.
    pub fn run_command_detached(policy: ActionPolicy, program: &str, args: &[&str]) -> Self {
        let executor = command::ExternalCommandAction::new(program, args, true);
        Self::new(
            format!("launch {}", executor.display_line()),
            policy,
            Arc::new(executor),
        )
    }

    /// Run a raw command line (typically an `UninstallString` registry
    /// value). The line is split into executable and arguments at
    /// execution time; a malformed line surfaces as `InvalidTarget` in the
    /// report.
    pub fn run_command_line(policy: ActionPolicy, line: &str) -> Self {
        let executor = command::ExternalCommandAction::from_line(line, false);
        Self::new(format!("run {}", executor.display_line()), policy, Arc::new(executor))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish()
    }
}
