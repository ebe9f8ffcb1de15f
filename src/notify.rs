//! User-facing notifications
//!
//! Session operations record their outcome here instead of failing loudly:
//! a failed remote call becomes an error notification and the session state
//! stays as it was.

use serde::Serialize;
use std::collections::VecDeque;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

/// Queue of notifications awaiting display
#[derive(Debug, Default)]
pub struct Notifications {
    pending: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) {
        let notification = Notification {
            level,
            title: title.into(),
            message: message.into(),
        };
        match level {
            NotificationLevel::Warning | NotificationLevel::Error => {
                warn!(title = %notification.title, message = %notification.message, "Notification");
            }
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(title = %notification.title, message = %notification.message, "Notification");
            }
        }
        self.pending.push_back(notification);
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NotificationLevel::Info, title, message);
    }

    pub fn success(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NotificationLevel::Success, title, message);
    }

    pub fn warning(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NotificationLevel::Warning, title, message);
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NotificationLevel::Error, title, message);
    }

    /// Take every pending notification, oldest first
    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
