//! # Manifest Schema and Parsing
//!
//! This module defines the data structures that represent a provisioning
//! manifest (`.repo-provision.yaml`) and the logic for parsing it.
//!
//! A manifest is an ordered mapping from a logical name to a node. Each node
//! is either a `submodule` or a `remote`, and may additionally carry a
//! `symlink` to create once the node has been applied:
//!
//! ```yaml
//! vendor-lib:
//!   type: submodule
//!   repository: https://example.com/vendor-lib.git
//!   directory: libs/vendor-lib
//!   branch: main
//!   remotes:
//!     upstream:
//!       type: remote
//!       repository: https://example.com/upstream/vendor-lib.git
//!       merge: true
//!   symlink:
//!     target: libs/vendor-lib/assets
//!     link: web/public/vendor
//! ```
//!
//! ## Key Components
//!
//! - **`Manifest`**: the ordered list of top-level `ConfigNode`s. Order in the
//!   file is the order in which nodes are applied.
//! - **`ConfigNode`**: a named node with a `NodeKind` and an optional
//!   `SymlinkSpec` attachment.
//! - **`NodeKind`**: `Submodule(SubmoduleSpec)` or `Remote(RemoteSpec)`.
//!
//! Parsing goes through a loose intermediate representation so that errors can
//! name the offending node and key instead of surfacing raw serde messages.
//! JSON manifests are accepted as well, since JSON is a subset of YAML.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// The node types a manifest may declare.
pub const ALLOWED_TYPES: [&str; 2] = ["submodule", "remote"];

/// A symbolic link to create after a node has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkSpec {
    /// Existing directory the link points at, relative to the node's base.
    pub target: String,
    /// Path of the link to create, relative to the node's base.
    pub link: String,
}

/// Submodule node configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleSpec {
    /// URL of the repository to add as a submodule.
    pub repository: String,
    /// Directory for the submodule. Required when the node is applied.
    pub directory: Option<String>,
    /// Branch to track. Discovered from the remote's HEAD when omitted.
    pub branch: Option<String>,
    /// Nodes applied inside the submodule's directory once it exists.
    pub remotes: Vec<ConfigNode>,
}

/// Remote node configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSpec {
    /// URL the remote points at.
    pub repository: String,
    /// Repository directory to add the remote to. Defaults to the node's base.
    pub directory: Option<String>,
    /// Fetch the remote and merge `<name>/<branch>` after adding it.
    pub merge: bool,
    /// Branch merged when `merge` is set. Defaults to [`DEFAULT_MERGE_BRANCH`].
    pub branch: Option<String>,
}

/// Branch merged from a freshly added remote when none is configured.
pub const DEFAULT_MERGE_BRANCH: &str = "master";

impl RemoteSpec {
    /// The branch to merge from this remote.
    pub fn merge_branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_MERGE_BRANCH)
    }
}

/// What a node provisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Add a git submodule.
    Submodule(SubmoduleSpec),
    /// Add a git remote, optionally fetching and merging it.
    Remote(RemoteSpec),
}

impl NodeKind {
    /// The `type` string this kind is declared with.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Submodule(_) => "submodule",
            NodeKind::Remote(_) => "remote",
        }
    }
}

/// A named entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    /// Logical name, used as the submodule or remote name.
    pub name: String,
    pub kind: NodeKind,
    pub symlink: Option<SymlinkSpec>,
}

/// The complete manifest, in application order.
pub type Manifest = Vec<ConfigNode>;

/// Node counts for a manifest, including nested nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManifestSummary {
    pub submodules: usize,
    pub remotes: usize,
    pub symlinks: usize,
    /// Deepest nesting level; a flat manifest has depth 1.
    pub depth: usize,
}

/// Count the nodes of a manifest.
pub fn summarize(manifest: &[ConfigNode]) -> ManifestSummary {
    let mut summary = ManifestSummary::default();
    summarize_into(manifest, 1, &mut summary);
    summary
}

fn summarize_into(nodes: &[ConfigNode], level: usize, summary: &mut ManifestSummary) {
    if nodes.is_empty() {
        return;
    }
    summary.depth = summary.depth.max(level);
    for node in nodes {
        if node.symlink.is_some() {
            summary.symlinks += 1;
        }
        match &node.kind {
            NodeKind::Submodule(sub) => {
                summary.submodules += 1;
                summarize_into(&sub.remotes, level + 1, summary);
            }
            NodeKind::Remote(_) => summary.remotes += 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSymlink {
    target: Option<String>,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: Option<String>,
    repository: Option<String>,
    directory: Option<String>,
    branch: Option<String>,
    merge: Option<bool>,
    remotes: Option<Mapping>,
    symlink: Option<RawSymlink>,
}

/// Parses a YAML (or JSON) string into a `Manifest`.
///
/// An empty document yields an empty manifest; rejecting that is left to the
/// provisioner so that `validate` can report it separately.
pub fn parse(yaml_content: &str) -> Result<Manifest> {
    match serde_yaml::from_str::<Value>(yaml_content)? {
        Value::Null => Ok(Vec::new()),
        Value::Mapping(map) => parse_mapping(map, ""),
        _ => Err(Error::configuration_with_hint(
            "Manifest must be a mapping of names to nodes",
            "Start each entry with a name, e.g. 'my-lib:' followed by its settings",
        )),
    }
}

/// Parse a Manifest from a YAML file path
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Manifest> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

fn parse_mapping(map: Mapping, parent: &str) -> Result<Manifest> {
    let mut nodes = Vec::with_capacity(map.len());
    for (key, value) in map {
        let name = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(Error::configuration(format!(
                    "Node names must be strings{}",
                    location(parent)
                )))
            }
        };
        nodes.push(convert_node(&name, value, parent)?);
    }
    Ok(nodes)
}

fn location(parent: &str) -> String {
    if parent.is_empty() {
        String::new()
    } else {
        format!(" (under '{}')", parent)
    }
}

fn convert_node(name: &str, value: Value, parent: &str) -> Result<ConfigNode> {
    let path = if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    };

    let raw: RawNode = serde_yaml::from_value(value).map_err(|e| {
        Error::configuration(format!("Node '{}' is malformed: {}", path, e))
    })?;

    let type_name = raw.kind.ok_or_else(|| {
        Error::configuration_with_hint(
            format!("Node '{}' has no 'type'", path),
            format!("Set 'type:' to one of {}", ALLOWED_TYPES.join(", ")),
        )
    })?;

    let repository = raw.repository.ok_or_else(|| {
        Error::configuration(format!("Node '{}' has no 'repository'", path))
    })?;

    let kind = match type_name.as_str() {
        "submodule" => {
            let remotes = match raw.remotes {
                Some(map) => parse_mapping(map, &path)?,
                None => Vec::new(),
            };
            NodeKind::Submodule(SubmoduleSpec {
                repository,
                directory: raw.directory,
                branch: raw.branch,
                remotes,
            })
        }
        "remote" => {
            if raw.remotes.is_some() {
                log::warn!(
                    "Ignoring 'remotes' on remote node '{}'; nested remotes belong to submodules",
                    path
                );
            }
            NodeKind::Remote(RemoteSpec {
                repository,
                directory: raw.directory,
                merge: raw.merge.unwrap_or(false),
                branch: raw.branch,
            })
        }
        other => {
            return Err(Error::configuration_with_hint(
                format!("Node '{}' has unknown type '{}'", path, other),
                format!("'type' must be one of {}", ALLOWED_TYPES.join(", ")),
            ))
        }
    };

    let symlink = raw
        .symlink
        .map(|raw_link| -> Result<SymlinkSpec> {
            let target = raw_link.target.ok_or_else(|| {
                Error::configuration(format!(
                    "Symbolic link target not set for node '{}'",
                    path
                ))
            })?;
            let link = raw_link.link.ok_or_else(|| {
                Error::configuration(format!("Symbolic link link not set for node '{}'", path))
            })?;
            Ok(SymlinkSpec { target, link })
        })
        .transpose()?;

    Ok(ConfigNode {
        name: name.to_string(),
        kind,
        symlink,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_manifest() {
        let yaml = r#"
dep1:
  type: submodule
  repository: https://example/dep1.git
  directory: libs/dep1
  branch: main
upstream:
  type: remote
  repository: https://example/upstream.git
  merge: true
"#;

        let manifest = parse(yaml).unwrap();
        assert_eq!(manifest.len(), 2);

        assert_eq!(manifest[0].name, "dep1");
        match &manifest[0].kind {
            NodeKind::Submodule(sub) => {
                assert_eq!(sub.repository, "https://example/dep1.git");
                assert_eq!(sub.directory.as_deref(), Some("libs/dep1"));
                assert_eq!(sub.branch.as_deref(), Some("main"));
                assert!(sub.remotes.is_empty());
            }
            _ => panic!("Expected submodule node"),
        }

        assert_eq!(manifest[1].name, "upstream");
        match &manifest[1].kind {
            NodeKind::Remote(remote) => {
                assert!(remote.merge);
                assert_eq!(remote.directory, None);
                assert_eq!(remote.merge_branch(), "master");
            }
            _ => panic!("Expected remote node"),
        }
    }

    #[test]
    fn test_parse_preserves_mapping_order() {
        let yaml = r#"
zeta: { type: remote, repository: z }
alpha: { type: remote, repository: a }
mid: { type: remote, repository: m }
"#;
        let names: Vec<_> = parse(yaml).unwrap().into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_nested_remotes() {
        let yaml = r#"
framework:
  type: submodule
  repository: https://example/framework.git
  directory: vendor/framework
  remotes:
    fork:
      type: remote
      repository: https://example/fork.git
      branch: develop
      merge: true
"#;
        let manifest = parse(yaml).unwrap();
        let NodeKind::Submodule(sub) = &manifest[0].kind else {
            panic!("Expected submodule node");
        };
        assert_eq!(sub.remotes.len(), 1);
        assert_eq!(sub.remotes[0].name, "fork");
        let NodeKind::Remote(remote) = &sub.remotes[0].kind else {
            panic!("Expected remote node");
        };
        assert_eq!(remote.merge_branch(), "develop");
    }

    #[test]
    fn test_parse_symlink() {
        let yaml = r#"
assets:
  type: remote
  repository: https://example/assets.git
  symlink:
    target: shared/assets
    link: app/public/assets
"#;
        let manifest = parse(yaml).unwrap();
        assert_eq!(
            manifest[0].symlink,
            Some(SymlinkSpec {
                target: "shared/assets".to_string(),
                link: "app/public/assets".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_symlink_missing_target() {
        let yaml = r#"
assets:
  type: remote
  repository: r
  symlink:
    link: app/public/assets
"#;
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("target not set"));
    }

    #[test]
    fn test_parse_symlink_missing_link() {
        let yaml = r#"
assets:
  type: remote
  repository: r
  symlink:
    target: shared/assets
"#;
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("link not set"));
    }

    #[test]
    fn test_parse_unknown_type() {
        let yaml = "thing: { type: subtree, repository: r }";
        let err = parse(yaml).unwrap_err();
        let display = err.to_string();
        assert!(display.contains("unknown type 'subtree'"));
        assert!(display.contains("submodule, remote"));
    }

    #[test]
    fn test_parse_unknown_type_nested_names_path() {
        let yaml = r#"
outer:
  type: submodule
  repository: r
  directory: d
  remotes:
    inner: { type: bogus, repository: r }
"#;
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("'outer.inner'"));
    }

    #[test]
    fn test_parse_missing_type() {
        let err = parse("thing: { repository: r }").unwrap_err();
        assert!(err.to_string().contains("has no 'type'"));
    }

    #[test]
    fn test_parse_missing_repository() {
        let err = parse("thing: { type: remote }").unwrap_err();
        assert!(err.to_string().contains("has no 'repository'"));
    }

    #[test]
    fn test_parse_submodule_without_directory_is_deferred() {
        // Rejected when applied, not when parsed
        let manifest = parse("thing: { type: submodule, repository: r }").unwrap();
        let NodeKind::Submodule(sub) = &manifest[0].kind else {
            panic!("Expected submodule node");
        };
        assert!(sub.directory.is_none());
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_sequence_is_rejected() {
        let err = parse("- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse("dep: [unclosed");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_parse_json_manifest() {
        let json = r#"{"dep1": {"type": "submodule", "repository": "u", "directory": "d"}}"#;
        let manifest = parse(json).unwrap();
        assert_eq!(manifest[0].kind.type_name(), "submodule");
    }

    #[test]
    fn test_from_file_nonexistent() {
        let result = from_file("/nonexistent/.repo-provision.yaml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_summarize_counts_nested_nodes() {
        let yaml = r#"
a:
  type: submodule
  repository: r
  directory: a
  symlink: { target: a, link: b/a }
  remotes:
    up: { type: remote, repository: r }
    down: { type: remote, repository: r }
b: { type: remote, repository: r }
"#;
        let summary = summarize(&parse(yaml).unwrap());
        assert_eq!(
            summary,
            ManifestSummary {
                submodules: 1,
                remotes: 3,
                symlinks: 1,
                depth: 2,
            }
        );
    }
}
