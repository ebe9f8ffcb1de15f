//! Configuration
//!
//! Layered with the `config` crate: struct defaults, then the user config
//! file, then the workspace file, then `REPO_AUDIT__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

fn default_branch() -> String {
    "main".to_string()
}

fn default_host() -> String {
    "github.com".to_string()
}

/// Repository defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Branch loaded when none is given
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Host whose repository URLs are accepted
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            host: default_host(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
