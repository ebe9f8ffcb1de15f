//! Repo Audit CLI Binary

use anyhow::Context;
use clap::Parser;
use repo_audit::logging::init_logging;
use repo_audit::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let context = CliContext::new(&cli.workspace, cli.config.as_deref())
        .context("Error loading configuration")?;
    init_logging(&context.config().logging).context("Error initializing logging")?;

    let output = context.execute(&cli.command)?;
    println!("{}", output);
    Ok(())
}
