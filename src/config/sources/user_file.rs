//! User config file in the platform config directory (optional)

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::PathBuf;

/// `<config dir>/repo-audit/config.toml`, when the platform has a config dir
pub fn path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "repo-audit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match path() {
        Some(path) => builder.add_source(File::from(path).required(false)),
        None => builder,
    }
}
