//! # Symlink Creation
//!
//! Links are created with a relative target so that the provisioned tree can
//! be moved without breaking them. A link at `a/b/c` pointing at `shared/x`
//! (both relative to the same base) gets the target `../../shared/x`.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::SymlinkSpec;
use crate::error::{Error, Result};

/// Whether [`create`] made a new link or found it already in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkOutcome {
    Created,
    AlreadyPresent,
}

/// The `../` prefix that climbs from the link's directory back to its base.
///
/// One `../` per `/`-separated segment of `link`, minus one for the link's
/// own name.
pub fn relative_prefix(link: &str) -> String {
    let depth = link.split('/').count().saturating_sub(1);
    "../".repeat(depth)
}

/// The target the link will store, e.g. `../../shared/assets`.
pub fn relative_target(spec: &SymlinkSpec) -> PathBuf {
    PathBuf::from(format!("{}{}", relative_prefix(&spec.link), spec.target))
}

/// Creates the link described by `spec`, resolving both paths against `base`.
///
/// The target must be an existing directory. Missing parent directories of
/// the link are created. An existing link that already points at the computed
/// target is left alone; anything else occupying the link path is an error.
pub fn create(base: &Path, spec: &SymlinkSpec) -> Result<SymlinkOutcome> {
    let target_path = base.join(&spec.target);
    if !target_path.is_dir() {
        return Err(Error::configuration(format!(
            "Symbolic link target directory '{}' doesn't exist",
            spec.target
        )));
    }

    let link_path = base.join(&spec.link);
    let relative = relative_target(spec);

    if let Ok(existing) = fs::read_link(&link_path) {
        if existing == relative {
            debug!("Symlink {} already points at {}", spec.link, relative.display());
            return Ok(SymlinkOutcome::AlreadyPresent);
        }
        return Err(Error::configuration(format!(
            "'{}' is already a symbolic link to '{}', expected '{}'",
            spec.link,
            existing.display(),
            relative.display()
        )));
    }

    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent)?;
    }

    info!("Linking {} -> {}", spec.link, relative.display());
    symlink_dir(&relative, &link_path)?;
    Ok(SymlinkOutcome::Created)
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}
