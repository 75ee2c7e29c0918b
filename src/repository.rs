//! # Repository Root
//!
//! `RepositoryRoot` is the validated, canonical path of the git working tree
//! being provisioned. Every other operation takes paths relative to it.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The top-level directory of an existing git working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRoot {
    path: PathBuf,
}

impl RepositoryRoot {
    /// Checks whether `path` holds a `.git` entry.
    ///
    /// A `.git` file counts as well as a directory, so worktrees and
    /// checked-out submodules are accepted.
    pub fn has_git_repository(path: &Path) -> bool {
        path.join(".git").exists()
    }

    /// Validates `path` and resolves it to its canonical absolute form.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !Self::has_git_repository(path) {
            let cwd = std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|_| "<unknown>".to_string());
            return Err(Error::configuration_with_hint(
                format!("'{}' is not a git repository (resolved from '{}')", path.display(), cwd),
                "Run 'git init' first or pass --root pointing at an existing repository",
            ));
        }
        Ok(Self {
            path: path.canonicalize()?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for RepositoryRoot {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
