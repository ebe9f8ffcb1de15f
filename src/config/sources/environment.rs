//! Environment variable source: REPO_AUDIT_* prefix with __ separator

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

/// Add environment variable overlay to builder.
/// `REPO_AUDIT__REPOSITORY__DEFAULT_BRANCH=dev` sets `repository.default_branch`.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("REPO_AUDIT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
