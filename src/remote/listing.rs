//! Source host listing format
//!
//! A recursive tree listing names each item with a `type` of `blob` (file),
//! `tree` (directory) or `commit` (submodule) and carries the item's `sha`.

use crate::tree::RepositoryEntry;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingItemType {
    Blob,
    Tree,
    Commit,
}

/// One item of a recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub path: String,
    #[serde(rename = "type")]
    pub item_type: ListingItemType,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Convert listing items into repository entries.
///
/// Blobs become files keyed by their sha, trees become directories.
/// Submodule commits have no browsable content and are skipped.
pub fn entries_from_listing(items: &[ListingItem]) -> Vec<RepositoryEntry> {
    items
        .iter()
        .filter_map(|item| match item.item_type {
            ListingItemType::Blob => Some(RepositoryEntry::file(&item.path, &item.sha)),
            ListingItemType::Tree => Some(RepositoryEntry::directory(&item.path)),
            ListingItemType::Commit => {
                debug!(path = %item.path, "Skipping submodule entry");
                None
            }
        })
        .collect()
}
