// src/actions/method.rs

use crate::errors::ActionError;

/// Contract implemented by every action kind.
pub trait ActionExecutor: Send + Sync {
    /// Checks whether the desired state already holds.
    ///
    /// Executors for unverifiable mutations (external commands) return
    /// `Ok(false)` unconditionally.
    fn is_satisfied(&self) -> Result<bool, ActionError>;

    /// Attempts to bring the system into the desired state.
    ///
    /// Must be idempotent: applying twice leaves the same system state as
    /// applying once, and a target that is already in the desired state is
    /// never an error.
    fn apply(&self) -> Result<(), ActionError>;
}
