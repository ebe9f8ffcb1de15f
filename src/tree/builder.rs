//! Tree reconstruction from a flat repository listing
//!
//! Entries arrive in no particular order and only name their own path. The
//! builder synthesizes every implied ancestor directory, links each node to
//! its parent exactly once, then sorts every level into display order.

use crate::tree::node::{NodeKind, RepositoryEntry, TreeNode};
use crate::types::ContentId;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Arena slot used while the tree is being assembled
struct Slot {
    name: String,
    path: String,
    kind: NodeKind,
    content_id: Option<ContentId>,
    children: Vec<usize>,
    /// Cleared when an ancestor is converted to a file
    live: bool,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    by_path: HashMap<String, usize>,
    roots: Vec<usize>,
}

impl Arena {
    /// Ensure a directory exists at `path`, linking it under `parent`.
    ///
    /// Returns `None` when `path` is already a file: a file is never
    /// downgraded into an ancestor directory.
    fn ensure_directory(&mut self, parent: Option<usize>, name: &str, path: &str) -> Option<usize> {
        if let Some(&idx) = self.by_path.get(path) {
            return match self.slots[idx].kind {
                NodeKind::Directory => Some(idx),
                NodeKind::File => None,
            };
        }
        Some(self.insert(parent, name, path, NodeKind::Directory, None))
    }

    fn insert(
        &mut self,
        parent: Option<usize>,
        name: &str,
        path: &str,
        kind: NodeKind,
        content_id: Option<ContentId>,
    ) -> usize {
        let idx = self.slots.len();
        self.slots.push(Slot {
            name: name.to_string(),
            path: path.to_string(),
            kind,
            content_id,
            children: Vec::new(),
            live: true,
        });
        self.by_path.insert(path.to_string(), idx);
        match parent {
            Some(p) => self.slots[p].children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    /// Convert a synthesized directory into a file, discarding its subtree
    fn convert_to_file(&mut self, idx: usize, content_id: Option<ContentId>) {
        let children = std::mem::take(&mut self.slots[idx].children);
        let mut stack = children;
        while let Some(child) = stack.pop() {
            let slot = &mut self.slots[child];
            slot.live = false;
            self.by_path.remove(&slot.path);
            stack.extend(std::mem::take(&mut slot.children));
        }
        let slot = &mut self.slots[idx];
        slot.kind = NodeKind::File;
        slot.content_id = content_id;
    }

    fn place(&mut self, entry: &RepositoryEntry) {
        let segments: Vec<&str> = entry.path.split('/').collect();
        let Some((last, ancestors)) = segments.split_last() else {
            return;
        };

        let mut parent: Option<usize> = None;
        let mut prefix = String::with_capacity(entry.path.len());
        for segment in ancestors {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            match self.ensure_directory(parent, segment, &prefix) {
                Some(idx) => parent = Some(idx),
                None => {
                    warn!(
                        path = %entry.path,
                        file = %prefix,
                        "Dropping entry nested beneath a file"
                    );
                    return;
                }
            }
        }

        match self.by_path.get(&entry.path).copied() {
            None => {
                self.insert(parent, last, &entry.path, entry.kind, file_content_id(entry));
            }
            Some(idx) => match (self.slots[idx].kind, entry.kind) {
                (NodeKind::Directory, NodeKind::File) => {
                    debug!(path = %entry.path, "Converting synthesized directory to file");
                    self.convert_to_file(idx, file_content_id(entry));
                }
                // Directory entry for an existing file: the file stays authoritative.
                (NodeKind::File, NodeKind::Directory) => {
                    warn!(path = %entry.path, "Ignoring directory entry shadowed by a file");
                }
                (NodeKind::Directory, NodeKind::Directory) => {}
                (NodeKind::File, NodeKind::File) => {
                    warn!(path = %entry.path, "Duplicate file entry; keeping the first");
                }
            },
        }
    }

    fn materialize(&self, idx: usize) -> TreeNode {
        let slot = &self.slots[idx];
        let mut children: Vec<TreeNode> = slot
            .children
            .iter()
            .filter(|&&c| self.slots[c].live)
            .map(|&c| self.materialize(c))
            .collect();
        children.sort_by(TreeNode::display_order);
        TreeNode {
            name: slot.name.clone(),
            path: slot.path.clone(),
            kind: slot.kind,
            children,
            content_id: slot.content_id.clone(),
        }
    }
}

fn file_content_id(entry: &RepositoryEntry) -> Option<ContentId> {
    match entry.kind {
        NodeKind::File => entry.content_id.clone(),
        NodeKind::Directory => None,
    }
}

/// Build the ordered forest of root nodes from a flat entry list.
///
/// The result owns all of its data and does not depend on input order. A
/// path declared as a file always wins over a directory synthesized at the
/// same path; entries nested beneath such a file are dropped.
pub fn build_tree(entries: &[RepositoryEntry]) -> Vec<TreeNode> {
    let mut arena = Arena::default();
    for entry in entries {
        arena.place(entry);
    }

    let mut forest: Vec<TreeNode> = arena
        .roots
        .iter()
        .filter(|&&r| arena.slots[r].live)
        .map(|&r| arena.materialize(r))
        .collect();
    forest.sort_by(TreeNode::display_order);

    debug!(
        entries = entries.len(),
        nodes = arena.by_path.len(),
        roots = forest.len(),
        "Built repository tree"
    );
    forest
}
