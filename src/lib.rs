//! # Repository Provisioning Library
//!
//! This library sets up the submodules, remotes and symlinks of an existing git
//! working tree from a declarative manifest. It backs the `repo-provision`
//! command-line tool but can be embedded in other build tooling.
//!
//! ## Quick Example
//!
//! ```no_run
//! use repo_provision::config;
//! use repo_provision::provisioner::RepositoryProvisioner;
//!
//! let manifest = config::parse(r#"
//! dep1:
//!   type: submodule
//!   repository: https://example.com/dep1.git
//!   directory: libs/dep1
//!   branch: main
//! "#).unwrap();
//!
//! let provisioner = RepositoryProvisioner::open(".").unwrap();
//! let report = provisioner.apply(&manifest).unwrap();
//! println!("{} changes", report.changed());
//! ```
//!
//! ## Modules
//!
//! - **`config`**: the manifest schema and its YAML parser.
//! - **`repository`**: validation of the repository root.
//! - **`git`**: the git command runner and its test seams.
//! - **`provisioner`**: the recursive walk that applies a manifest.
//! - **`symlink`**: relative symlink creation.
//! - **`output`**: CLI status line decoration.
//!
//! Git is always spawned with an explicit working directory; the library never
//! changes the current directory of the process.

pub mod config;
pub mod error;
pub mod git;
pub mod output;
pub mod provisioner;
pub mod repository;
pub mod symlink;
