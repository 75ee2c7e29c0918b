//! # Error Handling
//!
//! This module defines the centralized error type for `repo-provision`. It
//! uses `thiserror` to derive a single `Error` enum covering every failure the
//! provisioner can surface, and a `Result<T>` alias used across the library.
//!
//! There are two domain error kinds:
//!
//! - **`Configuration`**: the repository root or the manifest is unusable
//!   (missing `.git`, unknown node `type`, missing `directory`, bad symlink
//!   settings, a remote that reports no HEAD branch).
//! - **`GitCommand`**: the git executable exited with a non-zero status. The
//!   captured output travels with the error so callers can classify it.
//!
//! Everything else is wrapped from the underlying library error with
//! `#[from]`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for repo-provision operations
#[derive(Error, Debug)]
pub enum Error {
    /// The repository root or the provisioning manifest is invalid.
    ///
    /// Carries an optional hint describing how to fix the configuration.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The git executable returned a non-zero exit status.
    #[error("Git command failed in {}: {command} - {stderr}", directory.display())]
    GitCommand {
        command: String,
        directory: PathBuf,
        stderr: String,
    },

    /// A required executable could not be located on the search path.
    #[error("Executable not found: {name} - {message}")]
    ExecutableNotFound { name: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Shorthand for a configuration error without a hint.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a configuration error with a hint.
    pub fn configuration_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
