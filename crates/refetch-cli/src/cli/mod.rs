//! CLI for refetch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use refetch_core::config;

use commands::{run_get, run_show_config, GetArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "refetch")]
#[command(about = "refetch: fetch JSON with bounded sequential retries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a JSON resource, retrying failed attempts, and print it.
    Get(GetArgs),

    /// Show the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get(args) => run_get(&cfg, args).await?,
            CliCommand::Config => run_show_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
