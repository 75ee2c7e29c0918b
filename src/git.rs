//! # Git Command Runner
//!
//! Every git command the provisioner issues goes through [`GitRunner`]. The
//! runner resolves the git executable once, then spawns it with an explicit
//! working directory for each invocation. The parent process's current
//! directory is never changed, so a failing command cannot leave the process
//! stranded in another directory.
//!
//! Two traits separate the runner from the host system, which keeps it
//! testable without a real git binary:
//!
//! - **`ExecutableLocator`**: finds an executable on the search path.
//!   `WhichLocator` uses the `which` crate.
//! - **`CommandExecutor`**: runs a program and captures its output.
//!   `SystemExecutor` uses `std::process::Command`.

use std::cell::OnceCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::error::{Error, Result};

/// A single git command and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInvocation {
    /// Arguments passed to git, without the executable itself.
    pub args: Vec<String>,
    /// Working directory of the spawned process.
    pub directory: PathBuf,
}

impl GitInvocation {
    pub fn new<I, S>(args: I, directory: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            directory: directory.into(),
        }
    }

    /// The arguments joined with spaces, e.g. `remote add origin <url>`.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

impl fmt::Display for GitInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.command_line())
    }
}

/// Trait for locating executables - allows injecting a fake in tests
pub trait ExecutableLocator: Send + Sync {
    /// Returns the absolute path of the executable called `name`.
    fn locate(&self, name: &str) -> Result<PathBuf>;
}

/// Trait for running a program - allows mocking git in tests
pub trait CommandExecutor: Send + Sync {
    /// Runs `program` with the invocation's arguments inside its directory.
    ///
    /// Returns the captured stdout on success. A non-zero exit must be
    /// reported as [`Error::GitCommand`] carrying the captured output.
    fn execute(&self, program: &Path, invocation: &GitInvocation) -> Result<String>;
}

/// Locates executables on `PATH` with the `which` crate.
pub struct WhichLocator;

impl ExecutableLocator for WhichLocator {
    fn locate(&self, name: &str) -> Result<PathBuf> {
        which::which(name).map_err(|e| Error::ExecutableNotFound {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// Spawns real processes with `std::process::Command`.
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, program: &Path, invocation: &GitInvocation) -> Result<String> {
        let output = Command::new(program)
            .args(&invocation.args)
            .current_dir(&invocation.directory)
            .output()
            .map_err(|e| Error::GitCommand {
                command: invocation.to_string(),
                directory: invocation.directory.clone(),
                stderr: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // git reports some failures on stdout, keep both
            let captured = [stderr.trim(), stdout.trim()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::GitCommand {
                command: invocation.to_string(),
                directory: invocation.directory.clone(),
                stderr: captured,
            });
        }

        Ok(stdout)
    }
}

/// Runs git commands rooted at a repository.
///
/// The git executable is looked up on first use and cached for the lifetime
/// of the runner.
pub struct GitRunner {
    root: PathBuf,
    locator: Box<dyn ExecutableLocator>,
    executor: Box<dyn CommandExecutor>,
    git_path: OnceCell<PathBuf>,
}

impl GitRunner {
    /// Creates a runner for `root` that uses the system git.
    pub fn new(root: PathBuf) -> Self {
        Self::with_backends(root, Box::new(WhichLocator), Box::new(SystemExecutor))
    }

    /// Creates a runner with custom locator and executor implementations.
    pub fn with_backends(
        root: PathBuf,
        locator: Box<dyn ExecutableLocator>,
        executor: Box<dyn CommandExecutor>,
    ) -> Self {
        Self {
            root,
            locator,
            executor,
            git_path: OnceCell::new(),
        }
    }

    /// The directory commands run in when none is given.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the git executable, resolved on first call.
    pub fn git_path(&self) -> Result<&Path> {
        if let Some(path) = self.git_path.get() {
            return Ok(path.as_path());
        }
        let path = self.locator.locate("git")?;
        debug!("Resolved git executable to {}", path.display());
        Ok(self.git_path.get_or_init(|| path).as_path())
    }

    /// Runs git with `args` in `directory`, or in the root when `None`.
    ///
    /// A relative `directory` is taken relative to the root. A directory that
    /// does not exist yet is created, parents included.
    pub fn run<I, S>(&self, args: I, directory: Option<&Path>) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let directory = match directory {
            Some(dir) if dir.is_relative() => self.root.join(dir),
            Some(dir) => dir.to_path_buf(),
            None => self.root.clone(),
        };

        if !directory.is_dir() {
            debug!("Creating missing directory {}", directory.display());
            fs::create_dir_all(&directory)?;
        }

        let invocation = GitInvocation::new(args, directory);
        let git = self.git_path()?;
        info!(
            "Running {} in {}",
            invocation.command_line(),
            invocation.directory.display()
        );
        self.executor.execute(git, &invocation)
    }
}
