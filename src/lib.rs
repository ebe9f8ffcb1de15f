//! Repo Audit: repository tree reconstruction and review result caching
//!
//! Rebuilds a navigable file tree from a source host's flat listing and
//! memoizes AI security analysis and rewrite results by content fingerprint,
//! so a file revision is never sent to the remote service twice.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod remote;
pub mod session;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod view;

pub use cache::{analysis_key, rewrite_key, CacheStats, EntryState, ResultCache};
pub use error::{ApiError, RemoteError};
pub use session::{AuditSession, OpenFile};
pub use tree::{build_tree, NodeKind, RepositoryEntry, TreeNode};
pub use view::{ViewMode, ViewStateController};
