// src/errors.rs

use thiserror::Error;

/// Failure taxonomy for a single action.
///
/// Every variant is caught at the action boundary by the runner and turned
/// into a report record; nothing crosses a plan execution as a panic.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The target does not exist. Delete- and stop-style executors never
    /// return this: for them an absent target is the desired state.
    #[error("target not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Malformed registry path, name pattern, or command line.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("command `{command}` exited with code {code}")]
    ExternalCommandFailed { command: String, code: i32 },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl ActionError {
    /// Classifies an io error against the taxonomy, keeping `target` as the
    /// diagnostic subject.
    pub fn from_io(err: std::io::Error, target: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(target.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied(target.to_string()),
            _ => Self::Unknown(
                anyhow::Error::new(err).context(format!("failed operating on '{}'", target)),
            ),
        }
    }
}
