//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays a manifest's
//! nodes hierarchically: submodules with their nested remotes, and the symlink
//! each node creates.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::borrow::Cow;
use std::path::PathBuf;

use repo_provision::config::{self, ConfigNode, NodeKind};

/// Display the manifest as a tree
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Path to the manifest file.
    #[arg(short, long, value_name = "FILE", default_value = ".repo-provision.yaml")]
    pub config: PathBuf,

    /// Maximum depth to display in the tree.
    ///
    /// Use 1 to show only the top-level nodes.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs) -> Result<()> {
    let config_path = &args.config;
    let manifest = config::from_file(config_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load manifest from {}: {}",
            config_path.display(),
            e
        )
    })?;

    let tree_root = TreeNode {
        label: config_path.display().to_string(),
        children: build_children(&manifest, args.depth.unwrap_or(usize::MAX), 1),
    };
    print_tree(&tree_root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

fn build_children(nodes: &[ConfigNode], max_depth: usize, depth: usize) -> Vec<TreeNode> {
    if depth > max_depth {
        return Vec::new();
    }
    nodes
        .iter()
        .map(|node| build_tree_node(node, max_depth, depth))
        .collect()
}

/// Build a tree node from a manifest node
fn build_tree_node(node: &ConfigNode, max_depth: usize, depth: usize) -> TreeNode {
    let (label, mut children) = match &node.kind {
        NodeKind::Submodule(sub) => {
            let mut label = format!("{} [submodule] {}", node.name, sub.repository);
            if let Some(dir) = &sub.directory {
                label.push_str(&format!(" -> {}", dir));
            }
            if let Some(branch) = &sub.branch {
                label.push_str(&format!(" @ {}", branch));
            }
            (label, build_children(&sub.remotes, max_depth, depth + 1))
        }
        NodeKind::Remote(remote) => {
            let mut label = format!("{} [remote] {}", node.name, remote.repository);
            if remote.merge {
                label.push_str(&format!(" (merge {})", remote.merge_branch()));
            }
            (label, Vec::new())
        }
    };

    if let Some(spec) = &node.symlink {
        children.push(TreeNode {
            label: format!("symlink {} -> {}", spec.link, spec.target),
            children: Vec::new(),
        });
    }

    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::from(&self.children[..])
    }
}
