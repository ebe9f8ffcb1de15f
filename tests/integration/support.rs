//! In-memory stand-ins for the source host and analysis service

use async_trait::async_trait;
use parking_lot::Mutex;
use repo_audit::error::RemoteError;
use repo_audit::remote::{Finding, RepositoryRef, RepositorySource, SecurityAnalyzer, Severity};
use repo_audit::tree::RepositoryEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct FakeSource {
    pub entries: Mutex<Vec<RepositoryEntry>>,
    pub blobs: Mutex<HashMap<String, String>>,
    pub fail_listing: Mutex<bool>,
    pub list_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let source = FakeSource::default();
        for (path, content) in files {
            let id = format!("blob-{}", path);
            source.entries.lock().push(RepositoryEntry::file(*path, id.clone()));
            source.blobs.lock().insert(id, content.to_string());
        }
        source
    }
}

#[async_trait]
impl RepositorySource for FakeSource {
    async fn list_entries(
        &self,
        _repo: &RepositoryRef,
        _branch: &str,
    ) -> Result<Vec<RepositoryEntry>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_listing.lock() {
            return Err(RemoteError::Unavailable("Not Found".to_string()));
        }
        Ok(self.entries.lock().clone())
    }

    async fn fetch_file_content(
        &self,
        _repo: &RepositoryRef,
        content_id: &str,
    ) -> Result<String, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .lock()
            .get(content_id)
            .cloned()
            .ok_or_else(|| RemoteError::Unavailable(format!("unknown blob {}", content_id)))
    }
}

/// Reports one finding per `eval(` occurrence and rewrites them to `safeEval(`
#[derive(Default)]
pub struct FakeAnalyzer {
    pub analyze_calls: AtomicUsize,
    pub rewrite_calls: AtomicUsize,
    pub fail_analyze: Mutex<bool>,
    pub fail_rewrite: Mutex<bool>,
}

#[async_trait]
impl SecurityAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _path: &str, content: &str) -> Result<Vec<Finding>, RemoteError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_analyze.lock() {
            return Err(RemoteError::Unavailable("rate limited".to_string()));
        }
        Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains("eval("))
            .map(|(i, _)| {
                Finding::new("Code injection via eval", Severity::Critical)
                    .with_cwe("CWE-95", "Eval Injection")
                    .at_line(i as u32 + 1)
            })
            .collect())
    }

    async fn rewrite(
        &self,
        _path: &str,
        content: &str,
        _findings: &[String],
    ) -> Result<String, RemoteError> {
        self.rewrite_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_rewrite.lock() {
            return Err(RemoteError::Unavailable("model overloaded".to_string()));
        }
        Ok(content.replace("eval(", "safeEval("))
    }
}
