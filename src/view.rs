//! Original/corrected view toggle
//!
//! Each open file shows either its original content or a rewrite held in
//! the rewrite cache. Switching back to the original keeps the cache entry,
//! so flipping to the corrected view again is answered from the cache.

use crate::cache::ResultCache;
use crate::types::Fingerprint;
use std::future::Future;
use tracing::debug;

/// Which content the renderer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Original,
    Corrected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ViewState {
    Original,
    Corrected { key: Fingerprint, content: String },
}

/// Per-file view state machine
#[derive(Debug, Clone)]
pub struct ViewStateController {
    state: ViewState,
}

impl Default for ViewStateController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStateController {
    pub fn new() -> Self {
        Self {
            state: ViewState::Original,
        }
    }

    pub fn mode(&self) -> ViewMode {
        match self.state {
            ViewState::Original => ViewMode::Original,
            ViewState::Corrected { .. } => ViewMode::Corrected,
        }
    }

    /// Cache key of the rewrite currently shown
    pub fn corrected_key(&self) -> Option<&str> {
        match &self.state {
            ViewState::Original => None,
            ViewState::Corrected { key, .. } => Some(key),
        }
    }

    /// Handle a rewrite request.
    ///
    /// While corrected, the request switches back to the original. Otherwise
    /// the rewrite for `key` is taken from `cache`, produced through it on a
    /// miss. On failure the view stays original and the error is returned.
    pub async fn request_rewrite<F, Fut, E>(
        &mut self,
        cache: &ResultCache<String>,
        key: &str,
        produce: F,
    ) -> Result<ViewMode, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let ViewState::Corrected { .. } = self.state {
            return Ok(self.show_original());
        }

        let content = cache.get_or_compute(key, produce).await?;
        debug!(key, "Showing corrected content");
        self.state = ViewState::Corrected {
            key: key.to_string(),
            content,
        };
        Ok(ViewMode::Corrected)
    }

    /// Switch back to the original content. No effect when already original.
    pub fn show_original(&mut self) -> ViewMode {
        if let ViewState::Corrected { key, .. } = &self.state {
            debug!(key = %key, "Reverting to original content");
        }
        self.state = ViewState::Original;
        ViewMode::Original
    }

    /// Content the renderer should show for a file whose original is `original`
    pub fn effective_content<'a>(&'a self, original: &'a str) -> &'a str {
        match &self.state {
            ViewState::Original => original,
            ViewState::Corrected { content, .. } => content,
        }
    }
}
