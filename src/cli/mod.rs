pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::open_store;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio CLI - inspect content and manage admins in the configured store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print all projects and certificates")]
    Dump,

    #[command(about = "Admin account management")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Run one command against the store named by the environment.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    let store = open_store(&config)
        .await
        .with_context(|| format!("failed to open the {} store", config.store.backend))?;

    let result = match cli.command {
        Commands::Dump => commands::dump::handle(store.as_ref(), output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, store.as_ref(), &config, output_format).await,
    };

    store.close().await;
    result
}
