//! MergeService: orchestrates sources and deserializes to AuditConfig.

use crate::config::sources::{environment, user_file, workspace_file};
use crate::config::AuditConfig;
use crate::error::ApiError;
use config::{Config, File};
use std::path::Path;
use tracing::debug;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: user file (lowest) -> workspace file -> environment (highest).
    /// Missing fields fall back to the serde defaults of [`AuditConfig`].
    pub fn load(workspace_root: &Path) -> Result<AuditConfig, ApiError> {
        let builder = Config::builder();
        let builder = user_file::add_to_builder(builder);
        let builder = workspace_file::add_to_builder(builder, workspace_root);
        let builder = environment::add_to_builder(builder);

        let config: AuditConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load config from a specific file; the file must exist.
    pub fn load_from_file(path: &Path) -> Result<AuditConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = Config::builder().add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);

        let config: AuditConfig = builder.build()?.try_deserialize()?;
        debug!(file = %path.display(), "Loaded configuration file");
        Ok(config)
    }
}
