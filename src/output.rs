//! # Output Configuration
//!
//! Controls how the CLI decorates its status lines. With colors enabled each
//! line starts with an emoji, otherwise with a bracketed plain-text marker so
//! that logs and dumb terminals stay readable.
//!
//! The `--color` flag takes precedence; in `auto` mode the usual environment
//! conventions apply:
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color` flag
    /// (`always`, `never` or `auto`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// The prefix for a status line of the given kind.
    pub fn marker(&self, marker: Marker) -> &'static str {
        let (fancy, plain) = match marker {
            Marker::Start => ("🔧", "[RUN]"),
            Marker::Scan => ("🔍", "[SCAN]"),
            Marker::Ok => ("✅", "[OK]"),
            Marker::Skip => ("⏭️", "[SKIP]"),
            Marker::Link => ("🔗", "[LINK]"),
            Marker::Info => ("📊", "[INFO]"),
            Marker::Error => ("❌", "[ERR]"),
        };
        if self.use_color {
            fancy
        } else {
            plain
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Kinds of status line the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    Scan,
    Ok,
    Skip,
    Link,
    Info,
    Error,
}
