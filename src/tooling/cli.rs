//! CLI Tooling
//!
//! Offline commands over repository listings saved as JSON: reconstruct and
//! print the tree, summarize it, and compute cache fingerprints.

use crate::cache::{analysis_key, rewrite_key};
use crate::config::{AuditConfig, ConfigLoader};
use crate::error::ApiError;
use crate::remote::{entries_from_listing, ListingItem};
use crate::tree::{build_tree, tree_stats, ExpandedFolders, RepositoryEntry, TreeNode};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Repo Audit CLI - repository tree and review cache tooling
#[derive(Parser)]
#[command(name = "repo-audit")]
#[command(about = "Repository tree reconstruction and review cache fingerprints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where repo-audit.toml is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild and print the tree of a saved listing
    Tree {
        /// JSON file with repository entries or a host tree listing
        entries: PathBuf,
        /// Expand this folder (repeatable)
        #[arg(long)]
        expand: Vec<String>,
        /// Expand every folder
        #[arg(long)]
        expand_all: bool,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// File and directory counts per top-level entry
    Summary {
        entries: PathBuf,
    },
    /// Compute cache fingerprints
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Fingerprint of an analysis result
    Analysis {
        /// Repository path of the file
        path: String,
        /// Local file holding the content
        file: PathBuf,
    },
    /// Fingerprint of a rewrite result
    Rewrite {
        path: String,
        file: PathBuf,
        /// Finding description, in order (repeatable)
        #[arg(long = "finding")]
        findings: Vec<String>,
    },
}

/// Parse a saved listing: either `RepositoryEntry` records or host listing items
pub fn parse_entries(json: &str) -> Result<Vec<RepositoryEntry>, ApiError> {
    if let Ok(entries) = serde_json::from_str::<Vec<RepositoryEntry>>(json) {
        return Ok(entries);
    }
    let items: Vec<ListingItem> = serde_json::from_str(json).map_err(|e| {
        ApiError::InvalidInput(format!("Unrecognized entry list: {}", e))
    })?;
    Ok(entries_from_listing(&items))
}

fn read_file(path: &Path) -> Result<String, ApiError> {
    std::fs::read_to_string(path).map_err(|source| ApiError::IoError {
        path: path.to_path_buf(),
        source,
    })
}

fn load_tree(path: &Path) -> Result<Vec<TreeNode>, ApiError> {
    let entries = parse_entries(&read_file(path)?)?;
    debug!(file = %path.display(), entries = entries.len(), "Loaded entry list");
    Ok(build_tree(&entries))
}

/// Render the visible rows of a forest as an indented listing
pub fn format_tree_text(forest: &[TreeNode], expanded: &ExpandedFolders) -> String {
    let mut out = String::new();
    for row in expanded.visible_rows(forest) {
        let indent = "  ".repeat(row.depth);
        if row.node.is_directory() {
            let marker = if row.expanded { "v" } else { ">" };
            out.push_str(&format!(
                "{}{} {}/\n",
                indent,
                marker,
                row.node.name.blue().bold()
            ));
        } else {
            out.push_str(&format!("{}  {}\n", indent, row.node.name));
        }
    }
    out
}

fn format_summary(forest: &[TreeNode]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Kind", "Files", "Directories"]);
    for node in forest {
        let stats = tree_stats(std::slice::from_ref(node));
        let kind = if node.is_directory() { "dir" } else { "file" };
        table.add_row(vec![
            node.path.clone(),
            kind.to_string(),
            stats.files.to_string(),
            stats.directories.saturating_sub(usize::from(node.is_directory())).to_string(),
        ]);
    }
    let totals = tree_stats(forest);
    format!(
        "{}\n\nTotal: {} files, {} directories",
        table, totals.files, totals.directories
    )
}

/// CLI execution context
pub struct CliContext {
    config: AuditConfig,
}

impl CliContext {
    pub fn new(workspace: &Path, config_file: Option<&Path>) -> Result<Self, ApiError> {
        let config = match config_file {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace)?,
        };
        Ok(Self { config })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Tree {
                entries,
                expand,
                expand_all,
                format,
            } => {
                let forest = load_tree(entries)?;
                match format {
                    OutputFormat::Json => serde_json::to_string_pretty(&forest).map_err(|e| {
                        ApiError::InvalidInput(format!("Failed to serialize tree: {}", e))
                    }),
                    OutputFormat::Text => {
                        let mut expanded = ExpandedFolders::new();
                        if *expand_all {
                            expanded.expand_all(&forest);
                        }
                        for path in expand {
                            expanded.expand(path);
                        }
                        Ok(format_tree_text(&forest, &expanded))
                    }
                }
            }
            Commands::Summary { entries } => Ok(format_summary(&load_tree(entries)?)),
            Commands::Key { command } => match command {
                KeyCommands::Analysis { path, file } => {
                    Ok(analysis_key(path, &read_file(file)?))
                }
                KeyCommands::Rewrite {
                    path,
                    file,
                    findings,
                } => Ok(rewrite_key(path, &read_file(file)?, findings)),
            },
        }
    }
}
