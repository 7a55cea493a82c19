// src/actions/command.rs

use std::process::{Command, Stdio};

use tracing::debug;

use super::method::ActionExecutor;
use crate::errors::ActionError;

/// Runs one external executable with fixed arguments.
///
/// There is no general idempotence probe for an arbitrary external tool,
/// so `is_satisfied` is constantly false and the action runs every time
/// its plan does. Callers that need idempotence pair it with an explicit
/// state-check action earlier in the plan.
#[derive(Debug, Clone)]
pub struct ExternalCommandAction {
    invocation: Invocation,
    detach: bool,
}

#[derive(Debug, Clone)]
enum Invocation {
    Parts { program: String, args: Vec<String> },
    /// A raw command line (typically an uninstall string read out of the
    /// registry), split at execution time.
    Line(String),
}

impl ExternalCommandAction {
    pub fn new(program: &str, args: &[&str], detach: bool) -> Self {
        Self {
            invocation: Invocation::Parts {
                program: program.to_string(),
                args: args.iter().map(|arg| arg.to_string()).collect(),
            },
            detach,
        }
    }

    pub fn from_line(line: &str, detach: bool) -> Self {
        Self {
            invocation: Invocation::Line(line.to_string()),
            detach,
        }
    }

    /// The human-readable command line, for action names and errors.
    pub(crate) fn display_line(&self) -> String {
        match &self.invocation {
            Invocation::Parts { program, args } if args.is_empty() => program.clone(),
            Invocation::Parts { program, args } => format!("{} {}", program, args.join(" ")),
            Invocation::Line(line) => line.clone(),
        }
    }

    fn resolve(&self) -> Result<(String, Vec<String>), ActionError> {
        match &self.invocation {
            Invocation::Parts { program, args } => Ok((program.clone(), args.clone())),
            Invocation::Line(line) => {
                let (program, rest) = split_command_line(line)?;
                let args = rest.split_whitespace().map(str::to_string).collect();
                Ok((program, args))
            }
        }
    }
}

impl ActionExecutor for ExternalCommandAction {
    fn is_satisfied(&self) -> Result<bool, ActionError> {
        Ok(false)
    }

    fn apply(&self) -> Result<(), ActionError> {
        let line = self.display_line();
        let (program, args) = self.resolve()?;

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(windows::Win32::System::Threading::CREATE_NO_WINDOW.0);
        }

        if self.detach {
            let child = command
                .spawn()
                .map_err(|e| ActionError::from_io(e, &line))?;
            debug!("Launched '{}' detached as pid {}.", line, child.id());
            return Ok(());
        }

        let status = command
            .status()
            .map_err(|e| ActionError::from_io(e, &line))?;
        debug!("'{}' exited with {:?}.", line, status.code());
        if status.success() {
            Ok(())
        } else {
            Err(ActionError::ExternalCommandFailed {
                command: line,
                code: status.code().unwrap_or(-1),
            })
        }
    }
}

/// Splits an uninstall-style command line into executable and argument
/// string.
///
/// Grammar: either a leading double-quoted path followed by arguments, or
/// everything up to the first whitespace. This is exactly the shape of
/// `UninstallString` registry values; nothing fancier is attempted.
pub fn split_command_line(line: &str) -> Result<(String, String), ActionError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ActionError::InvalidTarget("empty command line".to_string()));
    }

    if let Some(rest) = line.strip_prefix('"') {
        let Some(end) = rest.find('"') else {
            return Err(ActionError::InvalidTarget(format!(
                "unterminated quote in '{}'",
                line
            )));
        };
        let program = &rest[..end];
        if program.is_empty() {
            return Err(ActionError::InvalidTarget(format!(
                "empty executable in '{}'",
                line
            )));
        }
        Ok((program.to_string(), rest[end + 1..].trim_start().to_string()))
    } else {
        match line.split_once(char::is_whitespace) {
            Some((program, args)) => Ok((program.to_string(), args.trim_start().to_string())),
            None => Ok((line.to_string(), String::new())),
        }
    }
}
