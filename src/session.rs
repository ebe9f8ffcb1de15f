//! Audit Session
//!
//! Owns everything one user session works with: the current repository
//! tree, folder expansion, the analysis and rewrite caches, and the view
//! state of each open file. Caches live exactly as long as the session and
//! survive repository reloads, since their keys are content-addressed.

use crate::cache::{analysis_key, rewrite_key, ResultCache};
use crate::config::RepositoryConfig;
use crate::error::{ApiError, RemoteError};
use crate::notify::{Notification, Notifications};
use crate::remote::{describe_all, Finding, RepositorySource, RepositoryRef, SecurityAnalyzer};
use crate::tree::{build_tree, find_node, tree_stats, ExpandedFolders, TreeNode, TreeStats, VisibleRow};
use crate::view::{ViewMode, ViewStateController};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Repository currently loaded into the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRepository {
    pub repo: RepositoryRef,
    pub branch: String,
}

/// A file selected for review.
///
/// Its view state is created here, when the file is opened, so a file that
/// was never analyzed still has one (in `Original`). Closing the file or
/// reloading the repository drops it.
#[derive(Debug, Clone)]
pub struct OpenFile {
    pub path: String,
    pub content: String,
    /// Findings of the last successful analysis of `content`
    pub findings: Option<Vec<Finding>>,
    view: ViewStateController,
}

impl OpenFile {
    pub fn view_mode(&self) -> ViewMode {
        self.view.mode()
    }

    /// What the renderer shows: original content or the current rewrite
    pub fn effective_content(&self) -> &str {
        self.view.effective_content(&self.content)
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub struct AuditSession {
    source: Arc<dyn RepositorySource>,
    analyzer: Arc<dyn SecurityAnalyzer>,
    settings: RepositoryConfig,
    repository: Option<LoadedRepository>,
    tree: Vec<TreeNode>,
    expanded: ExpandedFolders,
    analysis_cache: ResultCache<Vec<Finding>>,
    rewrite_cache: ResultCache<String>,
    open_files: HashMap<String, OpenFile>,
    notifications: Notifications,
}

impl AuditSession {
    pub fn new(
        source: Arc<dyn RepositorySource>,
        analyzer: Arc<dyn SecurityAnalyzer>,
        settings: RepositoryConfig,
    ) -> Self {
        Self {
            source,
            analyzer,
            settings,
            repository: None,
            tree: Vec::new(),
            expanded: ExpandedFolders::new(),
            analysis_cache: ResultCache::new("analysis"),
            rewrite_cache: ResultCache::new("rewrite"),
            open_files: HashMap::new(),
            notifications: Notifications::new(),
        }
    }

    /// Load a repository listing and rebuild the tree from scratch.
    ///
    /// On failure the previously loaded tree and open files are kept.
    /// `branch` defaults to the configured default branch.
    pub async fn load_repository(
        &mut self,
        url: &str,
        branch: Option<&str>,
    ) -> Result<TreeStats, ApiError> {
        self.notifications
            .info("Loading Repository", "Fetching repository structure...");

        let repo = match RepositoryRef::parse(url, &self.settings.host) {
            Ok(repo) => repo,
            Err(err) => {
                self.notifications
                    .error("Repository Load Failed", err.to_string());
                return Err(err);
            }
        };
        let branch = branch
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(&self.settings.default_branch)
            .to_string();

        let entries = match self.source.list_entries(&repo, &branch).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(repo = %repo, branch = %branch, error = %err, "Repository listing failed");
                self.notifications
                    .error("Repository Load Failed", err.to_string());
                return Err(err.into());
            }
        };

        self.tree = build_tree(&entries);
        self.expanded.clear();
        self.open_files.clear();
        let stats = tree_stats(&self.tree);
        info!(
            repo = %repo,
            branch = %branch,
            files = stats.files,
            directories = stats.directories,
            "Loaded repository"
        );
        self.notifications.success(
            "Repository Loaded",
            format!("{} loaded successfully", repo),
        );
        self.repository = Some(LoadedRepository { repo, branch });
        Ok(stats)
    }

    pub fn repository(&self) -> Option<&LoadedRepository> {
        self.repository.as_ref()
    }

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    /// Expand or collapse a directory; returns whether it is now expanded
    pub fn toggle_folder(&mut self, path: &str) -> Result<bool, ApiError> {
        let node = find_node(&self.tree, path).ok_or_else(|| ApiError::PathNotFound(path.to_string()))?;
        if node.is_file() {
            return Err(ApiError::NotADirectory(path.to_string()));
        }
        Ok(self.expanded.toggle(path))
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow<'_>> {
        self.expanded.visible_rows(&self.tree)
    }

    /// Fetch a file's content and open it for review.
    ///
    /// Opening an already open file returns it unchanged: content ids are
    /// content hashes, so the fetched text could not differ.
    pub async fn open_file(&mut self, path: &str) -> Result<&OpenFile, ApiError> {
        if self.open_files.contains_key(path) {
            return self
                .open_files
                .get(path)
                .ok_or_else(|| ApiError::FileNotOpen(path.to_string()));
        }

        let loaded = self.repository.as_ref().ok_or(ApiError::NoRepository)?;
        let node = find_node(&self.tree, path).ok_or_else(|| ApiError::PathNotFound(path.to_string()))?;
        let content_id = match (&node.content_id, node.is_file()) {
            (Some(id), true) => id.clone(),
            _ => return Err(ApiError::NotAFile(path.to_string())),
        };

        let fetched = self
            .source
            .fetch_file_content(&loaded.repo, &content_id)
            .await
            .and_then(|content| {
                if content.is_empty() {
                    Err(RemoteError::EmptyResponse("File is empty".to_string()))
                } else {
                    Ok(content)
                }
            });

        let name = file_name(path);
        match fetched {
            Ok(content) => {
                self.notifications
                    .info("File Loaded", format!("{} loaded successfully", name));
                let file = OpenFile {
                    path: path.to_string(),
                    content,
                    findings: None,
                    view: ViewStateController::new(),
                };
                let file = self.open_files.entry(path.to_string()).or_insert(file);
                Ok(&*file)
            }
            Err(err) => {
                self.notifications
                    .error("File Load Failed", format!("Failed to load {}: {}", name, err));
                Err(err.into())
            }
        }
    }

    pub fn open_file_state(&self, path: &str) -> Option<&OpenFile> {
        self.open_files.get(path)
    }

    /// Close a file, dropping its view state. Cached results stay.
    pub fn close_file(&mut self, path: &str) -> bool {
        self.open_files.remove(path).is_some()
    }

    /// Security findings for an open file, from cache or the analysis service
    pub async fn analyze(&mut self, path: &str) -> Result<Vec<Finding>, ApiError> {
        let file = self
            .open_files
            .get(path)
            .ok_or_else(|| ApiError::FileNotOpen(path.to_string()))?;
        let key = analysis_key(path, &file.content);
        let content = file.content.as_str();
        let analyzer = &self.analyzer;

        let result = self
            .analysis_cache
            .get_or_compute(&key, || analyzer.analyze(path, content))
            .await;

        match result {
            Ok(findings) => {
                if findings.is_empty() {
                    self.notifications
                        .success("Scan Complete", "No vulnerabilities found");
                } else {
                    self.notifications.warning(
                        "Vulnerabilities Found",
                        format!("Found {} potential issues", findings.len()),
                    );
                }
                if let Some(file) = self.open_files.get_mut(path) {
                    file.findings = Some(findings.clone());
                }
                Ok(findings)
            }
            Err(err) => {
                warn!(path, error = %err, "Analysis failed");
                self.notifications.error("Scan Failed", err.to_string());
                Err(err.into())
            }
        }
    }

    /// Toggle an analyzed file between its original and corrected content.
    ///
    /// The rewrite is keyed by path, content and the ordered findings it is
    /// meant to resolve; a failed rewrite leaves the original showing.
    pub async fn request_rewrite(&mut self, path: &str) -> Result<ViewMode, ApiError> {
        let file = self
            .open_files
            .get_mut(path)
            .ok_or_else(|| ApiError::FileNotOpen(path.to_string()))?;
        let descriptions = match &file.findings {
            Some(findings) => describe_all(findings),
            None => return Err(ApiError::NotAnalyzed(path.to_string())),
        };
        let key = rewrite_key(path, &file.content, &descriptions);
        let OpenFile { content, view, .. } = file;
        let content = content.as_str();
        let analyzer = &self.analyzer;

        let result = view
            .request_rewrite(&self.rewrite_cache, &key, || async {
                let rewritten = analyzer.rewrite(path, content, &descriptions).await?;
                let rewritten = rewritten.trim();
                if rewritten.is_empty() {
                    return Err(RemoteError::EmptyResponse(
                        "Rewrite returned no code".to_string(),
                    ));
                }
                Ok::<String, RemoteError>(rewritten.to_string())
            })
            .await;

        match result {
            Ok(ViewMode::Corrected) => {
                let count = descriptions.len();
                self.notifications.success(
                    "Code Fixed Successfully!",
                    format!(
                        "Fixed {} issue{} using AI",
                        count,
                        if count == 1 { "" } else { "s" }
                    ),
                );
                Ok(ViewMode::Corrected)
            }
            Ok(ViewMode::Original) => {
                self.notifications
                    .info("Reverted to Original", "Showing original code");
                Ok(ViewMode::Original)
            }
            Err(err) => {
                warn!(path, error = %err, "Rewrite failed");
                self.notifications.error("Code Fix Failed", err.to_string());
                Err(err.into())
            }
        }
    }

    /// Content the renderer shows for an open file
    pub fn effective_content(&self, path: &str) -> Result<&str, ApiError> {
        self.open_files
            .get(path)
            .map(OpenFile::effective_content)
            .ok_or_else(|| ApiError::FileNotOpen(path.to_string()))
    }

    pub fn analysis_cache(&self) -> &ResultCache<Vec<Finding>> {
        &self.analysis_cache
    }

    pub fn rewrite_cache(&self) -> &ResultCache<String> {
        &self.rewrite_cache
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }
}
