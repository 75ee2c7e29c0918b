//! Apply command implementation
//!
//! The apply command:
//! 1. Validates the repository root
//! 2. Loads the manifest
//! 3. Adds submodules and remotes and creates symlinks, in manifest order
//! 4. Reports what changed and what was already in place

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repo_provision::config::from_file;
use repo_provision::output::{Marker, OutputConfig};
use repo_provision::provisioner::{Action, ApplyReport, RepositoryProvisioner};

/// Default manifest file name, looked up in the repository root.
pub const DEFAULT_MANIFEST: &str = ".repo-provision.yaml";

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the manifest (defaults to .repo-provision.yaml in the root)
    #[arg(short, long, value_name = "PATH", env = "REPO_PROVISION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the git repository to provision
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub root: PathBuf,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let config_path = args
        .config
        .unwrap_or_else(|| args.root.join(DEFAULT_MANIFEST));

    if !config_path.exists() {
        anyhow::bail!("Configuration file not found: {}", config_path.display());
    }

    let provisioner = RepositoryProvisioner::open(&args.root)?;

    if !args.quiet {
        println!(
            "{} Provisioning {}",
            out.marker(Marker::Start),
            provisioner.root().path().display()
        );
    }

    let manifest = from_file(&config_path)?;

    match provisioner.apply(&manifest) {
        Ok(report) => {
            if !args.quiet {
                print_report(&out, &report);
            }
            Ok(())
        }
        Err(e) => {
            if !args.quiet {
                println!("{} Provisioning failed", out.marker(Marker::Error));
            }
            Err(e.into())
        }
    }
}

fn print_report(out: &OutputConfig, report: &ApplyReport) {
    for action in &report.actions {
        let line = match action {
            Action::SubmoduleAdded {
                name,
                directory,
                branch,
            } => format!(
                "{} submodule {} added at {} ({})",
                out.marker(Marker::Ok),
                name,
                directory.display(),
                branch
            ),
            Action::SubmoduleSkipped { name, directory } => format!(
                "{} submodule {}: {} already exists",
                out.marker(Marker::Skip),
                name,
                directory.display()
            ),
            Action::RemoteAdded {
                name,
                directory,
                merged,
            } => format!(
                "{} remote {} added in {}{}",
                out.marker(Marker::Ok),
                name,
                directory.display(),
                if *merged { " and merged" } else { "" }
            ),
            Action::RemoteSkipped { name, repository } => format!(
                "{} remote {} ({}) already exists",
                out.marker(Marker::Skip),
                name,
                repository
            ),
            Action::SymlinkCreated { link, target } => format!(
                "{} {} -> {}",
                out.marker(Marker::Link),
                link.display(),
                target.display()
            ),
            Action::SymlinkSkipped { link } => format!(
                "{} symlink {} already in place",
                out.marker(Marker::Skip),
                link.display()
            ),
        };
        println!("   {}", line);
    }
    println!(
        "{} Done: {} changed, {} already in place",
        out.marker(Marker::Info),
        report.changed(),
        report.skipped()
    );
}
