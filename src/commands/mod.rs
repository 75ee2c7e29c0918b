//! # CLI Command Implementations
//!
//! Each subcommand of `repo-provision` lives in its own file with:
//! - An `Args` struct that defines the command-specific options, derived
//!   using `clap`.
//! - An `execute` function that runs the command on top of the
//!   `repo_provision` library.

pub mod apply;
pub mod completions;
pub mod tree;
pub mod validate;
