//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a manifest
//! without running git or touching the working tree.
//!
//! ## Functionality
//!
//! - **Schema Validation**: parses the manifest, rejecting unknown node types
//!   and incomplete symlink settings.
//! - **Node Checks**: every submodule must name a directory.
//! - **Root Checks** (with `--root`): the root must be a git repository, and
//!   symlink targets that do not exist yet are reported as warnings since an
//!   earlier node may still create them.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use repo_provision::config::{self, ConfigNode, NodeKind};
use repo_provision::output::{Marker, OutputConfig};
use repo_provision::repository::RepositoryRoot;

/// Validate a provisioning manifest
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the manifest to validate.
    #[arg(short, long, value_name = "FILE", default_value = ".repo-provision.yaml")]
    pub config: PathBuf,

    /// Also check the manifest against this repository root.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Use strict validation (fail on warnings).
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = &args.config;
    println!(
        "{} Validating manifest: {}",
        out.marker(Marker::Scan),
        config_path.display()
    );

    let manifest = match config::from_file(config_path) {
        Ok(manifest) => {
            println!("{} Manifest parsed successfully", out.marker(Marker::Ok));
            manifest
        }
        Err(e) => {
            println!("{} Manifest parsing failed: {}", out.marker(Marker::Error), e);
            return Err(anyhow::anyhow!("Manifest parsing failed: {}", e));
        }
    };

    let summary = config::summarize(&manifest);
    println!("\n{} Manifest Summary:", out.marker(Marker::Info));
    println!("   Top-level nodes: {}", manifest.len());
    println!("   Submodules: {}", summary.submodules);
    println!("   Remotes: {}", summary.remotes);
    println!("   Symlinks: {}", summary.symlinks);
    println!("   Nesting depth: {}", summary.depth);

    let mut findings = Findings::default();
    if manifest.is_empty() {
        findings
            .errors
            .push("The manifest is empty, there is nothing to provision".to_string());
    }

    let root = match &args.root {
        Some(path) => match RepositoryRoot::open(path) {
            Ok(root) => Some(root),
            Err(e) => {
                findings.errors.push(e.to_string());
                None
            }
        },
        None => None,
    };

    check_nodes(
        &manifest,
        root.as_ref().map(|r| r.path()),
        "",
        &mut findings,
    );

    for warning in &findings.warnings {
        println!("{} {}", out.marker(Marker::Skip), warning);
    }
    for error in &findings.errors {
        println!("{} {}", out.marker(Marker::Error), error);
    }

    if !findings.errors.is_empty() {
        anyhow::bail!("Validation failed with {} error(s)", findings.errors.len());
    }
    if args.strict && !findings.warnings.is_empty() {
        anyhow::bail!(
            "Validation failed with {} warning(s) in strict mode",
            findings.warnings.len()
        );
    }

    println!("\n{} Manifest is valid", out.marker(Marker::Ok));
    Ok(())
}

fn check_nodes(nodes: &[ConfigNode], base: Option<&Path>, parent: &str, findings: &mut Findings) {
    for node in nodes {
        let path = if parent.is_empty() {
            node.name.clone()
        } else {
            format!("{}.{}", parent, node.name)
        };

        let mut nested_base = base.map(Path::to_path_buf);
        if let NodeKind::Submodule(sub) = &node.kind {
            match &sub.directory {
                Some(dir) => nested_base = base.map(|b| b.join(dir)),
                None => findings
                    .errors
                    .push(format!("Submodule '{}' has no directory", path)),
            }
        }

        if let (Some(spec), Some(base)) = (&node.symlink, base) {
            if !base.join(&spec.target).is_dir() {
                findings.warnings.push(format!(
                    "Symlink target '{}' of '{}' does not exist yet",
                    spec.target, path
                ));
            }
        }

        if let NodeKind::Submodule(sub) = &node.kind {
            check_nodes(&sub.remotes, nested_base.as_deref(), &path, findings);
        }
    }
}
