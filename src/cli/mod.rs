//! CLI module for vgmdl

use clap::{Args, Parser, Subcommand};

pub mod commands;
pub mod prompt;

#[derive(Parser, Debug)]
#[command(name = "vgmdl", about = "Download video game soundtrack albums")]
#[command(version, author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub download: DownloadArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Arguments for downloading an album (the default action)
#[derive(Args, Debug, Default)]
pub struct DownloadArgs {
    /// Album page URL (prompted for when omitted)
    #[arg(long, env = "VGMDL_URL")]
    pub url: Option<String>,

    /// Folder the album directory is created in (prompted for when omitted)
    #[arg(long, env = "VGMDL_FOLDER")]
    pub folder: Option<String>,

    /// Number of parallel downloads
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Format token to look for in download links (e.g. MP3, OGG)
    #[arg(long)]
    pub format: Option<String>,

    /// Seconds to wait for a stalled track download, 0 to wait forever
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// List the album's tracks and art candidates without downloading
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the effective configuration
    Config,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
