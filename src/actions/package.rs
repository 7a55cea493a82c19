// src/actions/package.rs

use tracing::{info, warn};

use super::method::ActionExecutor;
use crate::{errors::ActionError, utils::powershell};

/// Ensures no installed AppX package matches a name pattern, for any user
/// profile.
///
/// Package state has no direct Win32 surface, so both the probe and the
/// removal go through hidden PowerShell invocations. Removal fans out over
/// every match: one refused package is recorded and does not stop the
/// others from going.
#[derive(Debug, Clone)]
pub struct RemovePackageAction {
    pattern: String,
}

impl RemovePackageAction {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }

    fn installed_matches(&self) -> Result<Vec<String>, ActionError> {
        let script = format!(
            "Get-AppxPackage -AllUsers -Name \"{}\" | Select-Object -ExpandProperty PackageFullName",
            self.pattern
        );
        let output = powershell::run_script(&script)?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

impl ActionExecutor for RemovePackageAction {
    fn is_satisfied(&self) -> Result<bool, ActionError> {
        Ok(self.installed_matches()?.is_empty())
    }

    fn apply(&self) -> Result<(), ActionError> {
        let matches = self.installed_matches()?;
        if matches.is_empty() {
            return Ok(());
        }

        let mut removed = Vec::new();
        let mut failed = Vec::new();
        for package in matches {
            let script = format!("Remove-AppxPackage -AllUsers -Package \"{}\"", package);
            match powershell::run_script(&script) {
                Ok(_) => {
                    info!("Removed package '{}'.", package);
                    removed.push(package);
                }
                Err(e) => {
                    warn!("Failed to remove package '{}': {}", package, e);
                    failed.push(package);
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            // The report detail carries both sides of the fan-out.
            Err(ActionError::Unknown(anyhow::anyhow!(
                "removed [{}]; failed [{}]",
                removed.join(", "),
                failed.join(", ")
            )))
        }
    }
}
