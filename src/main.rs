//! # Repository Provisioning CLI
//!
//! This is the binary entry point for the `repo-provision` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Installing the `env_logger` backend for the library's `log` output.
//! - Executing the selected command and reporting errors.
//!
//! The provisioning logic lives in the `repo_provision` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
