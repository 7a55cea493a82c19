// src/actions/process.rs

use tracing::{debug, warn};

use super::method::ActionExecutor;
use crate::{
    errors::ActionError,
    utils::{pattern::NamePattern, process},
};

/// Ensures no running process matches a name pattern.
///
/// Matching is case-insensitive against the image name, with and without
/// its `.exe` suffix, so plans can say `msedge` as the scripts always did.
#[derive(Debug, Clone)]
pub struct StopProcessAction {
    pattern: String,
}

impl StopProcessAction {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
        }
    }

    fn matching_processes(&self) -> Result<Vec<process::ProcessEntry>, ActionError> {
        let pattern = NamePattern::parse(&self.pattern)?;
        let processes = process::list_processes()?;
        Ok(processes
            .into_iter()
            .filter(|entry| pattern.matches(&entry.name) || pattern.matches(image_stem(&entry.name)))
            .collect())
    }
}

fn image_stem(image: &str) -> &str {
    let len = image.len();
    if len >= 4 && image[len - 4..].eq_ignore_ascii_case(".exe") {
        &image[..len - 4]
    } else {
        image
    }
}

impl ActionExecutor for StopProcessAction {
    fn is_satisfied(&self) -> Result<bool, ActionError> {
        Ok(self.matching_processes()?.is_empty())
    }

    fn apply(&self) -> Result<(), ActionError> {
        let matches = self.matching_processes()?;
        if matches.is_empty() {
            debug!("No running process matches '{}'.", self.pattern);
            return Ok(());
        }

        let mut failed = Vec::new();
        for entry in matches {
            match process::terminate(entry.pid) {
                Ok(()) => debug!("Terminated '{}' (pid {}).", entry.name, entry.pid),
                Err(e) => {
                    warn!("Failed to terminate '{}' (pid {}): {}", entry.name, entry.pid, e);
                    failed.push(format!("{} (pid {})", entry.name, entry.pid));
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ActionError::Unknown(anyhow::anyhow!(
                "could not terminate: {}",
                failed.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_stem_strips_exe_case_insensitively() {
        assert_eq!(image_stem("msedge.exe"), "msedge");
        assert_eq!(image_stem("Widgets.EXE"), "Widgets");
        assert_eq!(image_stem("svchost"), "svchost");
        assert_eq!(image_stem(".exe"), "");
    }

    #[test]
    fn stopping_a_process_nobody_runs_is_satisfied() {
        let action = StopProcessAction::new("winplan-no-such-process");
        assert!(action.is_satisfied().unwrap());
        action.apply().unwrap();
    }

    #[test]
    fn an_invalid_pattern_is_rejected_by_the_probe() {
        let action = StopProcessAction::new("ms*edge");
        assert!(matches!(
            action.is_satisfied(),
            Err(ActionError::InvalidTarget(_))
        ));
    }
}
