// src/actions/registry.rs

use tracing::debug;

use super::method::ActionExecutor;
use crate::{
    errors::ActionError,
    utils::registry::{self, RegistryValue},
};

/// Ensures a named registry value holds a specific typed payload.
#[derive(Debug, Clone)]
pub struct RegistryValueAction {
    path: String,
    value_name: String,
    value: RegistryValue,
}

impl RegistryValueAction {
    pub fn new(path: &str, value_name: &str, value: RegistryValue) -> Self {
        Self {
            path: path.to_string(),
            value_name: value_name.to_string(),
            value,
        }
    }
}

impl ActionExecutor for RegistryValueAction {
    /// Satisfied when the value exists with the desired type and data; a
    /// missing key or value is simply not satisfied.
    fn is_satisfied(&self) -> Result<bool, ActionError> {
        match registry::read_value(&self.path, &self.value_name)? {
            Some(current) => {
                let satisfied = current == self.value;
                if !satisfied {
                    debug!(
                        "'{}\\{}' is {}, desired {}.",
                        self.path, self.value_name, current, self.value
                    );
                }
                Ok(satisfied)
            }
            None => Ok(false),
        }
    }

    fn apply(&self) -> Result<(), ActionError> {
        registry::write_value(&self.path, &self.value_name, &self.value)
    }
}

/// Ensures a registry key, and everything under it, does not exist.
#[derive(Debug, Clone)]
pub struct DeleteRegistryKeyAction {
    path: String,
}

impl DeleteRegistryKeyAction {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl ActionExecutor for DeleteRegistryKeyAction {
    fn is_satisfied(&self) -> Result<bool, ActionError> {
        Ok(!registry::key_exists(&self.path)?)
    }

    fn apply(&self) -> Result<(), ActionError> {
        registry::delete_key(&self.path)
    }
}
