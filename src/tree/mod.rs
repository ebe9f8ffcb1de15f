//! Repository Tree
//!
//! Reconstruction of the hierarchical file/directory tree from the flat,
//! unordered listing a source host returns, plus navigation state over it.

pub mod builder;
pub mod expansion;
pub mod node;

pub use builder::build_tree;
pub use expansion::{ExpandedFolders, VisibleRow};
pub use node::{files, find_node, tree_stats, NodeKind, RepositoryEntry, TreeNode, TreeStats};
