//! vgmdl - Download video game soundtrack albums

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod download;
mod error;
mod site;
mod utils;

use cli::{Cli, Commands};
use utils::ProgressAwareWriter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "vgmdl=debug,reqwest=debug"
    } else {
        "vgmdl=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(ProgressAwareWriter),
        )
        .init();

    match cli.command {
        None => cli::commands::download(cli.download).await?,
        Some(Commands::Config) => cli::commands::show_config()?,
        Some(Commands::Completion { shell }) => cli::commands::completion(shell),
    }

    Ok(())
}
