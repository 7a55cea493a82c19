// src/actions/fs.rs

use std::{fs, io, path::PathBuf};

use tracing::debug;

use super::method::ActionExecutor;
use crate::errors::ActionError;

/// Ensures a file or directory tree does not exist.
#[derive(Debug, Clone)]
pub struct DeletePathAction {
    path: PathBuf,
}

impl DeletePathAction {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ActionExecutor for DeletePathAction {
    fn is_satisfied(&self) -> Result<bool, ActionError> {
        // symlink_metadata so a dangling link still counts as present.
        match fs::symlink_metadata(&self.path) {
            Ok(_) => Ok(false),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(ActionError::from_io(e, &self.path.display().to_string())),
        }
    }

    fn apply(&self) -> Result<(), ActionError> {
        let target = self.path.display().to_string();
        let metadata = match fs::symlink_metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("'{}' is already gone.", target);
                return Ok(());
            }
            Err(e) => return Err(ActionError::from_io(e, &target)),
        };

        let removed = if metadata.file_type().is_dir() {
            fs::remove_dir_all(&self.path)
        } else {
            fs::remove_file(&self.path)
        };
        match removed {
            Ok(()) => Ok(()),
            // Lost a race with someone else deleting it: still the desired
            // state.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ActionError::from_io(e, &target)),
        }
    }
}

/// Ensures a directory (with all parents) exists.
#[derive(Debug, Clone)]
pub struct EnsureDirectoryAction {
    path: PathBuf,
}

impl EnsureDirectoryAction {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ActionExecutor for EnsureDirectoryAction {
    fn is_satisfied(&self) -> Result<bool, ActionError> {
        Ok(self.path.is_dir())
    }

    fn apply(&self) -> Result<(), ActionError> {
        fs::create_dir_all(&self.path)
            .map_err(|e| ActionError::from_io(e, &self.path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, ActionPolicy};

    #[test]
    fn deleting_a_file_then_rechecking_is_satisfied() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lockfile");
        fs::write(&file, b"busy").unwrap();

        let action = Action::delete_path(ActionPolicy::Required, &file);
        assert!(!action.is_satisfied().unwrap());
        action.apply().unwrap();
        assert!(action.is_satisfied().unwrap());
        assert!(!file.exists());
    }

    #[test]
    fn deleting_a_directory_tree_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("edge");
        fs::create_dir_all(root.join("Application").join("1.0")).unwrap();
        fs::write(root.join("Application").join("msedge.dat"), b"x").unwrap();

        let executor = DeletePathAction::new(root.clone());
        executor.apply().unwrap();
        assert!(executor.is_satisfied().unwrap());
    }

    #[test]
    fn deleting_an_absent_path_is_satisfied_and_applies_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-created");

        let executor = DeletePathAction::new(missing);
        assert!(executor.is_satisfied().unwrap());
        executor.apply().unwrap();
    }

    #[test]
    fn ensure_directory_creates_parents_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");

        let action = Action::ensure_directory(ActionPolicy::Required, &nested);
        assert!(!action.is_satisfied().unwrap());
        action.apply().unwrap();
        assert!(action.is_satisfied().unwrap());

        // Second apply finds the tree in place and changes nothing.
        action.apply().unwrap();
        assert!(nested.is_dir());
    }
}
