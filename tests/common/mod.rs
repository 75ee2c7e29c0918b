//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_git_dir().with_manifest(manifests::SYMLINK_ONLY);
//! fixture.command().arg("apply").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git;
    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// An already-present submodule plus a symlink into it. Needs no git.
    pub const SYMLINK_ONLY: &str = r#"
dep1:
  type: submodule
  repository: https://example/dep1.git
  directory: libs/dep1
  symlink:
    target: libs/dep1
    link: web/vendor/dep1
"#;

    /// A nested manifest covering every node kind.
    pub const NESTED: &str = r#"
framework:
  type: submodule
  repository: https://example/framework.git
  directory: vendor/framework
  branch: main
  remotes:
    fork:
      type: remote
      repository: https://example/fork.git
      merge: true
upstream:
  type: remote
  repository: https://example/upstream.git
"#;

    /// A node with an unsupported type.
    pub const UNKNOWN_TYPE: &str = "thing: { type: subtree, repository: u }";

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "dep1: [unclosed";
}

/// A test fixture that provides a temporary directory with optional manifest.
#[allow(dead_code)]
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Mark the directory as a repository root without running git.
    pub fn with_git_dir(self) -> Self {
        self.temp_dir
            .child(".git")
            .create_dir_all()
            .expect("Failed to create .git");
        self
    }

    /// Add a `.repo-provision.yaml` manifest with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp_dir
            .child(".repo-provision.yaml")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Create a directory inside the fixture.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join(".repo-provision.yaml")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `repo-provision` command running inside the fixture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-provision");
        cmd.current_dir(self.path()).arg("--color").arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Helpers that drive a real git binary to build fixture repositories.
#[allow(dead_code)]
pub mod git {
    use super::*;

    /// Run git in `dir`, panicking with its output on failure.
    pub fn run(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("Failed to spawn git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// `git init` on branch `main` with a local identity.
    pub fn init(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        run(dir, &["init", "-q", "-b", "main"]);
        run(dir, &["config", "user.email", "test@example.com"]);
        run(dir, &["config", "user.name", "Test"]);
        run(dir, &["config", "commit.gpgsign", "false"]);
    }

    /// Write `path` and commit it.
    pub fn commit_file(dir: &Path, path: &str, content: &str) {
        let file = dir.join(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(file, content).unwrap();
        run(dir, &["add", path]);
        run(dir, &["commit", "-q", "-m", &format!("add {}", path)]);
    }

    /// Whether the configured remotes of `dir` include `name`.
    pub fn has_remote(dir: &Path, name: &str) -> bool {
        run(dir, &["remote"]).lines().any(|line| line.trim() == name)
    }

    /// Allow `submodule add` from local paths for child git processes.
    ///
    /// Callers must be `#[serial]` since this mutates the process environment.
    pub fn allow_file_protocol() {
        std::env::set_var("GIT_CONFIG_COUNT", "1");
        std::env::set_var("GIT_CONFIG_KEY_0", "protocol.file.allow");
        std::env::set_var("GIT_CONFIG_VALUE_0", "always");
    }
}
