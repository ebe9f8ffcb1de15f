//! Repository entry and tree node types

use crate::types::ContentId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One record of a flat repository listing.
///
/// Paths are slash-delimited and relative to the repository root. Ancestor
/// directories are implied and need not appear as entries of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub path: String,
    pub kind: NodeKind,
    /// Present iff `kind == File`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
}

impl RepositoryEntry {
    pub fn file(path: impl Into<String>, content_id: impl Into<ContentId>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
            content_id: Some(content_id.into()),
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Directory,
            content_id: None,
        }
    }
}

/// A node of the reconstructed repository tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
}

impl TreeNode {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Display order among siblings: directories first, then names compared
    /// case-insensitively. Exact name breaks ties so the order is total.
    pub fn display_order(&self, other: &TreeNode) -> Ordering {
        let rank = |kind: NodeKind| match kind {
            NodeKind::Directory => 0u8,
            NodeKind::File => 1u8,
        };
        rank(self.kind)
            .cmp(&rank(other.kind))
            .then_with(|| compare_names(&self.name, &other.name))
    }

    /// Find a descendant (or self) by full path
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        if self.path == path {
            return Some(self);
        }
        let rest = path.strip_prefix(self.path.as_str())?.strip_prefix('/')?;
        let next = rest.split('/').next()?;
        self.children
            .iter()
            .find(|child| child.name == next)
            .and_then(|child| child.find(path))
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Locate a node anywhere in a forest by full path
pub fn find_node<'a>(forest: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    let root = path.split('/').next()?;
    forest
        .iter()
        .find(|node| node.name == root)
        .and_then(|node| node.find(path))
}

/// All file nodes of a forest, depth-first in display order
pub fn files(forest: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.is_file() {
            out.push(node);
        } else {
            stack.extend(node.children.iter().rev());
        }
    }
    out
}

/// Tree size summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub files: usize,
    pub directories: usize,
}

pub fn tree_stats(forest: &[TreeNode]) -> TreeStats {
    fn walk(nodes: &[TreeNode], stats: &mut TreeStats) {
        for node in nodes {
            match node.kind {
                NodeKind::File => stats.files += 1,
                NodeKind::Directory => {
                    stats.directories += 1;
                    walk(&node.children, stats);
                }
            }
        }
    }
    let mut stats = TreeStats::default();
    walk(forest, &mut stats);
    stats
}
