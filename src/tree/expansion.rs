//! Folder expansion state
//!
//! Expand/collapse is tracked by path in a set beside the tree. The tree
//! nodes themselves never change, so paths handed out to the caches stay
//! valid across any number of toggles.

use crate::tree::node::TreeNode;
use std::collections::BTreeSet;

/// A row of the flattened, currently visible tree
#[derive(Debug, Clone, Copy)]
pub struct VisibleRow<'a> {
    pub depth: usize,
    pub node: &'a TreeNode,
    pub expanded: bool,
}

/// Set of expanded folder paths
#[derive(Debug, Clone, Default)]
pub struct ExpandedFolders {
    open: BTreeSet<String>,
}

impl ExpandedFolders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a folder; returns whether it is now expanded
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.open.remove(path) {
            false
        } else {
            self.open.insert(path.to_string());
            true
        }
    }

    pub fn expand(&mut self, path: &str) {
        self.open.insert(path.to_string());
    }

    pub fn collapse(&mut self, path: &str) {
        self.open.remove(path);
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.open.contains(path)
    }

    /// Expand every directory of the forest
    pub fn expand_all(&mut self, forest: &[TreeNode]) {
        let mut stack: Vec<&TreeNode> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_directory() {
                self.open.insert(node.path.clone());
                stack.extend(node.children.iter());
            }
        }
    }

    pub fn clear(&mut self) {
        self.open.clear();
    }

    /// Flatten the forest into the rows a renderer shows: every root, plus
    /// the children of each expanded directory whose ancestors are expanded.
    pub fn visible_rows<'a>(&self, forest: &'a [TreeNode]) -> Vec<VisibleRow<'a>> {
        let mut rows = Vec::new();
        let mut stack: Vec<(usize, &'a TreeNode)> =
            forest.iter().rev().map(|node| (0, node)).collect();
        while let Some((depth, node)) = stack.pop() {
            let expanded = node.is_directory() && self.is_expanded(&node.path);
            rows.push(VisibleRow {
                depth,
                node,
                expanded,
            });
            if expanded {
                stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
            }
        }
        rows
    }
}
