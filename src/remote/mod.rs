//! Remote collaborators
//!
//! The source host (listing and blob content) and the analysis service
//! (findings and rewrites) sit behind async traits. Every call is atomic:
//! it resolves to a value or a [`RemoteError`], and nothing here retries.

pub mod finding;
pub mod listing;

pub use finding::{describe_all, Finding, Severity};
pub use listing::{entries_from_listing, ListingItem, ListingItemType};

use crate::error::{ApiError, RemoteError};
use crate::tree::RepositoryEntry;
use async_trait::async_trait;
use std::fmt;

/// Owner/name pair identifying a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Parse a repository URL of the form `https://<host>/<owner>/<repo>[.git]`.
    pub fn parse(url: &str, host: &str) -> Result<Self, ApiError> {
        let invalid = || ApiError::InvalidRepositoryUrl(url.to_string());
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let marker = format!("{}/", host);
        let start = trimmed.find(&marker).ok_or_else(invalid)? + marker.len();
        let mut parts = trimmed[start..].split('/');
        let owner = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let repo = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        let name = repo.strip_suffix(".git").unwrap_or(repo);
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Source-control host: recursive listing and blob content
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn list_entries(
        &self,
        repo: &RepositoryRef,
        branch: &str,
    ) -> Result<Vec<RepositoryEntry>, RemoteError>;

    async fn fetch_file_content(
        &self,
        repo: &RepositoryRef,
        content_id: &str,
    ) -> Result<String, RemoteError>;
}

/// AI service producing findings and finding-driven rewrites
#[async_trait]
pub trait SecurityAnalyzer: Send + Sync {
    async fn analyze(&self, path: &str, content: &str) -> Result<Vec<Finding>, RemoteError>;

    /// Rewrite `content` so it resolves `findings` (given as descriptions, in order)
    async fn rewrite(
        &self,
        path: &str,
        content: &str,
        findings: &[String],
    ) -> Result<String, RemoteError>;
}
