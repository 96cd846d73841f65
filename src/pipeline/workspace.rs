//! Per-request scratch directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use uuid::Uuid;

/// An exclusively owned scratch directory for one request.
///
/// Every intermediate and final artifact of a pipeline run lives inside it.
/// The directory is removed on drop unless `keep` was requested, so
/// artifacts never outlive their request by accident.
pub struct Workspace {
    root: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Allocate a fresh uniquely named directory under `parent`.
    pub fn create(parent: &Path, keep: bool) -> Result<Self> {
        let root = parent.join(format!("refract-{}", Uuid::new_v4()));
        fs::create_dir_all(&root)
            .context(format!("failed to create workspace directory {:?}", root))?;
        Ok(Self { root, keep })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of a named file inside the workspace.
    pub fn join(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(error) = fs::remove_dir_all(&self.root) {
            warn!("Failed to remove workspace {:?}: {}", self.root, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspaces_never_collide() {
        let parent = tempfile::tempdir().unwrap();
        let first = Workspace::create(parent.path(), false).unwrap();
        let second = Workspace::create(parent.path(), false).unwrap();

        assert_ne!(first.path(), second.path());
        assert!(first.path().is_dir());
        assert!(second.path().is_dir());
    }

    #[test]
    fn dropping_removes_the_directory() {
        let parent = tempfile::tempdir().unwrap();
        let root = {
            let workspace = Workspace::create(parent.path(), false).unwrap();
            fs::write(workspace.join("in"), b"payload").unwrap();
            workspace.path().to_path_buf()
        };

        assert!(!root.exists());
    }

    #[test]
    fn keep_leaves_artifacts_in_place() {
        let parent = tempfile::tempdir().unwrap();
        let root = {
            let workspace = Workspace::create(parent.path(), true).unwrap();
            fs::write(workspace.join("out.png"), b"payload").unwrap();
            workspace.path().to_path_buf()
        };

        assert!(root.join("out.png").is_file());
    }

    #[test]
    fn join_stays_inside_the_workspace() {
        let parent = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(parent.path(), false).unwrap();

        assert_eq!(workspace.join("in").parent(), Some(workspace.path()));
    }
}
