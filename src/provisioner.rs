//! # Repository Provisioner
//!
//! `RepositoryProvisioner` applies a [`Manifest`] to a git working tree. It
//! walks the manifest in order and, for each node:
//!
//! 1.  **Submodule**: runs `git submodule add` unless the directory already
//!     exists, discovering the branch from the remote's HEAD when none is
//!     configured. Nested `remotes` are then applied inside the submodule's
//!     directory.
//! 2.  **Remote**: runs `git remote add`, optionally followed by `git fetch`
//!     and `git merge`. A remote that already exists is skipped.
//! 3.  **Symlink**: after either kind, creates the node's symlink if it has
//!     one.
//!
//! Relative paths in a node are resolved against its base directory: the
//! repository root for top-level nodes, the owning submodule's directory for
//! nested ones. The first error aborts the walk.

use std::path::{Path, PathBuf};

use log::{info, warn};
use regex::Regex;

use crate::config::{ConfigNode, Manifest, NodeKind};
use crate::error::{Error, Result};
use crate::git::GitRunner;
use crate::repository::RepositoryRoot;
use crate::symlink::{self, SymlinkOutcome};

/// Result of adding a submodule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmoduleOutcome {
    /// `git submodule add` ran, tracking `branch`.
    Added { branch: String },
    /// The directory already existed, nothing was run.
    AlreadyPresent,
}

/// Result of adding a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// The remote was added (and fetched and merged if requested).
    Added,
    /// git reported a remote with this name already exists.
    AlreadyExists,
}

/// One step taken while applying a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SubmoduleAdded {
        name: String,
        directory: PathBuf,
        branch: String,
    },
    SubmoduleSkipped {
        name: String,
        directory: PathBuf,
    },
    RemoteAdded {
        name: String,
        directory: PathBuf,
        merged: bool,
    },
    RemoteSkipped {
        name: String,
        repository: String,
    },
    SymlinkCreated {
        link: PathBuf,
        target: PathBuf,
    },
    SymlinkSkipped {
        link: PathBuf,
    },
}

impl Action {
    /// Whether the step changed the working tree.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Action::SubmoduleAdded { .. } | Action::RemoteAdded { .. } | Action::SymlinkCreated { .. }
        )
    }
}

/// Everything a call to [`RepositoryProvisioner::apply`] did, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub actions: Vec<Action>,
}

impl ApplyReport {
    pub fn changed(&self) -> usize {
        self.actions.iter().filter(|a| a.is_change()).count()
    }

    pub fn skipped(&self) -> usize {
        self.actions.len() - self.changed()
    }
}

/// Applies provisioning manifests to a repository.
pub struct RepositoryProvisioner {
    root: RepositoryRoot,
    git: GitRunner,
}

impl RepositoryProvisioner {
    /// Creates a provisioner that runs the system git in `root`.
    pub fn new(root: RepositoryRoot) -> Self {
        let git = GitRunner::new(root.path().to_path_buf());
        Self { root, git }
    }

    /// Creates a provisioner with a custom git runner.
    ///
    /// The runner should be rooted at `root`.
    pub fn with_runner(root: RepositoryRoot, git: GitRunner) -> Self {
        Self { root, git }
    }

    /// Validates `path` as a repository root and creates a provisioner for it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(RepositoryRoot::open(path)?))
    }

    pub fn root(&self) -> &RepositoryRoot {
        &self.root
    }

    /// Applies every node of `manifest`, in order.
    pub fn apply(&self, manifest: &Manifest) -> Result<ApplyReport> {
        if manifest.is_empty() {
            return Err(Error::configuration_with_hint(
                "The manifest is empty, there is nothing to provision",
                "Declare at least one submodule or remote",
            ));
        }
        let mut report = ApplyReport::default();
        self.apply_nodes(manifest, self.root.path(), &mut report)?;
        Ok(report)
    }

    fn apply_nodes(&self, nodes: &[ConfigNode], base: &Path, report: &mut ApplyReport) -> Result<()> {
        for node in nodes {
            match &node.kind {
                NodeKind::Submodule(sub) => {
                    let directory = sub.directory.as_deref();
                    let outcome = self.submodule_in(
                        base,
                        &sub.repository,
                        &node.name,
                        directory,
                        sub.branch.as_deref(),
                    )?;
                    // submodule_in has already rejected a missing directory
                    let dir = base.join(directory.unwrap_or_default());
                    report.actions.push(match outcome {
                        SubmoduleOutcome::Added { branch } => Action::SubmoduleAdded {
                            name: node.name.clone(),
                            directory: dir.clone(),
                            branch,
                        },
                        SubmoduleOutcome::AlreadyPresent => {
                            info!(
                                "Skipping submodule {}; {} already exists",
                                node.name,
                                dir.display()
                            );
                            Action::SubmoduleSkipped {
                                name: node.name.clone(),
                                directory: dir.clone(),
                            }
                        }
                    });
                    if !sub.remotes.is_empty() {
                        self.apply_nodes(&sub.remotes, &dir, report)?;
                    }
                }
                NodeKind::Remote(remote) => {
                    let directory = self.remote_directory(base, remote.directory.as_deref());
                    let outcome = self.remote_in(
                        &directory,
                        &remote.repository,
                        &node.name,
                        remote.merge,
                        remote.merge_branch(),
                    )?;
                    report.actions.push(match outcome {
                        RemoteOutcome::Added => Action::RemoteAdded {
                            name: node.name.clone(),
                            directory,
                            merged: remote.merge,
                        },
                        RemoteOutcome::AlreadyExists => {
                            info!(
                                "Skipping adding remote {}; Remote with this name already exists",
                                remote.repository
                            );
                            Action::RemoteSkipped {
                                name: node.name.clone(),
                                repository: remote.repository.clone(),
                            }
                        }
                    });
                }
            }

            if let Some(spec) = &node.symlink {
                let link = base.join(&spec.link);
                report.actions.push(match symlink::create(base, spec)? {
                    SymlinkOutcome::Created => Action::SymlinkCreated {
                        link,
                        target: symlink::relative_target(spec),
                    },
                    SymlinkOutcome::AlreadyPresent => {
                        info!("Skipping symlink {}; it is already in place", spec.link);
                        Action::SymlinkSkipped { link }
                    }
                });
            }
        }
        Ok(())
    }

    /// Adds `repository` as submodule `name` at `directory`, relative to the
    /// repository root.
    ///
    /// Returns [`SubmoduleOutcome::AlreadyPresent`] without running git when
    /// the directory already exists.
    pub fn add_submodule(
        &self,
        repository: &str,
        name: &str,
        directory: Option<&str>,
        branch: Option<&str>,
    ) -> Result<SubmoduleOutcome> {
        self.submodule_in(self.root.path(), repository, name, directory, branch)
    }

    fn submodule_in(
        &self,
        base: &Path,
        repository: &str,
        name: &str,
        directory: Option<&str>,
        branch: Option<&str>,
    ) -> Result<SubmoduleOutcome> {
        let directory = directory.ok_or_else(|| {
            Error::configuration_with_hint(
                format!("Submodule '{}' has no directory", name),
                "You must supply a directory relative to the git root",
            )
        })?;

        if base.join(directory).is_dir() {
            return Ok(SubmoduleOutcome::AlreadyPresent);
        }

        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => self.head_branch(repository)?,
        };

        self.git.run(
            [
                "submodule",
                "add",
                "-f",
                "-b",
                branch.as_str(),
                "--name",
                name,
                repository,
                directory,
            ],
            Some(base),
        )?;
        Ok(SubmoduleOutcome::Added { branch })
    }

    /// Adds remote `name` pointing at `repository` to the repository in
    /// `directory` (the root when `None`), then fetches it and merges
    /// `<name>/<branch>` when `merge` is set.
    ///
    /// A remote that already exists yields [`RemoteOutcome::AlreadyExists`];
    /// every other failure is returned as is.
    pub fn add_remote(
        &self,
        repository: &str,
        name: &str,
        directory: Option<&str>,
        merge: bool,
        branch: &str,
    ) -> Result<RemoteOutcome> {
        let directory = self.remote_directory(self.root.path(), directory);
        self.remote_in(&directory, repository, name, merge, branch)
    }

    fn remote_directory(&self, base: &Path, directory: Option<&str>) -> PathBuf {
        match directory {
            None => base.to_path_buf(),
            Some(dir) => {
                let joined = base.join(dir);
                // Nonexistent directories are created by the runner
                joined.canonicalize().unwrap_or(joined)
            }
        }
    }

    fn remote_in(
        &self,
        directory: &Path,
        repository: &str,
        name: &str,
        merge: bool,
        branch: &str,
    ) -> Result<RemoteOutcome> {
        let result = self
            .git
            .run(["remote", "add", name, repository], Some(directory))
            .and_then(|_| {
                if merge {
                    let tracking = format!("{}/{}", name, branch);
                    self.git.run(["fetch", name], Some(directory))?;
                    self.git.run(["merge", tracking.as_str()], Some(directory))?;
                }
                Ok(())
            });

        match result {
            Ok(()) => Ok(RemoteOutcome::Added),
            Err(Error::GitCommand { ref stderr, .. }) if remote_exists(stderr, name)? => {
                Ok(RemoteOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    /// Asks `remote` for its HEAD branch with `git remote show`.
    pub fn head_branch(&self, remote: &str) -> Result<String> {
        let output = self.git.run(["remote", "show", remote], None)?;
        if output.trim().is_empty() {
            return Err(Error::configuration(format!(
                "There was no result for '{}', check that the repository exists and is reachable",
                remote
            )));
        }
        match parse_head_branch(&output)? {
            Some(branch) => Ok(branch),
            None => {
                warn!("'git remote show {}' reported no HEAD branch", remote);
                Err(Error::configuration(format!(
                    "There is no HEAD branch for '{}'. Perhaps the repository hasn't been initialised yet",
                    remote
                )))
            }
        }
    }
}

/// Extracts the branch from a `HEAD branch: <name>` line, ignoring case.
pub fn parse_head_branch(output: &str) -> Result<Option<String>> {
    let pattern = Regex::new(r"(?i)HEAD branch: ([A-Za-z0-9_./-]+)")?;
    Ok(pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}

/// Whether git's error output says remote `name` is already configured.
fn remote_exists(stderr: &str, name: &str) -> Result<bool> {
    let pattern = Regex::new(&format!("remote {} already exists", regex::escape(name)))?;
    Ok(pattern.is_match(stderr))
}
