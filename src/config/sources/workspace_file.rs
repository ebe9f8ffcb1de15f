//! Workspace config file `repo-audit.toml` (optional)

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::Path;

pub const FILE_NAME: &str = "repo-audit.toml";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(workspace_root.join(FILE_NAME)).required(false))
}
