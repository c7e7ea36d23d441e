//! CLI command handlers

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use indicatif::MultiProgress;
use std::io;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{prompt, Cli, DownloadArgs};
use crate::config::Config;
use crate::download::{resolve_cover_art, AlbumDownloader, DownloadReport};
use crate::site::{AlbumFetcher, AlbumInfo, HttpFetch, SiteClient};
use crate::utils::{clean_album_title, safe_foldername, set_progress_target, track_filename};

/// Handle the default download action
pub async fn download(args: DownloadArgs) -> Result<()> {
    let config = apply_overrides(Config::load()?, &args);

    let Some(url) = prompt::album_url(args.url)? else {
        println!("{}", "No album URL given, nothing to do.".yellow());
        return Ok(());
    };

    // The folder is only needed when something will be written
    let folder = if args.dry_run {
        None
    } else {
        match prompt::destination_folder(args.folder)? {
            Some(folder) => Some(folder),
            None => {
                println!("{}", "Aborted.".yellow());
                return Ok(());
            }
        }
    };

    let http: Arc<dyn HttpFetch> = Arc::new(SiteClient::new(&config.user_agent)?);
    let fetcher = AlbumFetcher::new(Arc::clone(&http), &config.site_origin);

    println!("{}", "Fetching album page...".cyan());
    let info = fetcher
        .fetch_album(&url)
        .await
        .with_context(|| format!("Failed to read album page {}", url))?;

    let album = clean_album_title(&info.album);

    let Some(folder) = folder else {
        print_plan(&info, &album, &config.format);
        return Ok(());
    };

    let album_dir = folder.join(safe_foldername(&album));
    tokio::fs::create_dir_all(&album_dir)
        .await
        .with_context(|| format!("Failed to create {}", album_dir.display()))?;

    println!();
    println!("{} {}", "Album:".bold(), album.green().bold());
    if let Some(artist) = &info.artist {
        println!("{} {}", "Artist:".bold(), artist);
    }
    println!("{} {}", "Tracks:".bold(), info.tracks.len());
    println!("{} {}", "Folder:".bold(), album_dir.display());
    println!();

    let art_path =
        resolve_cover_art(http.as_ref(), &info.art_urls, &album_dir, config.art_timeout()).await;

    let cancel = CancellationToken::new();
    let listener = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let progress = MultiProgress::new();
    set_progress_target(Some(progress.clone()));

    let downloader = AlbumDownloader::new(
        fetcher,
        http,
        config.download_options(),
        cancel,
        progress,
    );
    let report = downloader
        .download_album(
            &info.tracks,
            &album_dir,
            art_path.as_deref(),
            info.artist.as_deref().unwrap_or_default(),
            &album,
        )
        .await;

    set_progress_target(None);
    listener.abort();

    print_summary(&report);
    Ok(())
}

/// Handle the `config` command
pub fn show_config() -> Result<()> {
    let config = Config::load()?;
    match Config::config_path() {
        Some(path) if path.exists() => println!("{} {}", "Config file:".bold(), path.display()),
        Some(path) => println!(
            "{} {} {}",
            "Config file:".bold(),
            path.display(),
            "(not present, using defaults)".yellow()
        ),
        None => println!("{}", "No config directory available, using defaults".yellow()),
    }

    let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
    println!("{}", json);
    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "vgmdl", &mut io::stdout());
}

/// Flags take precedence over the config file
fn apply_overrides(mut config: Config, args: &DownloadArgs) -> Config {
    if let Some(parallel) = args.parallel {
        config.parallel = parallel;
    }
    if let Some(format) = &args.format {
        config.format = format.clone();
    }
    if let Some(timeout) = args.timeout {
        config.stall_timeout_secs = timeout;
    }
    config
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("Interrupted, finishing downloads already in progress");
            cancel.cancel();
        }
        Err(e) => debug!("Could not listen for Ctrl-C: {}", e),
    }
}

fn print_plan(info: &AlbumInfo, album: &str, format: &str) {
    println!();
    println!("{}", "[DRY RUN] Would download:".yellow());
    println!("  Album: {}", album);
    println!("  Artist: {}", info.artist.as_deref().unwrap_or("(unknown)"));
    println!("  Folder: {}", safe_foldername(album));
    println!("  Art candidates:");
    for url in &info.art_urls {
        println!("    {}", url);
    }
    println!("  Tracks:");
    let extension = format.to_lowercase();
    for (index, track) in info.tracks.iter().enumerate() {
        println!("    {}", track_filename(index, &track.title, &extension));
    }
}

fn print_summary(report: &DownloadReport) {
    println!();
    if report.cancelled {
        println!("{}", "Cancelled.".yellow().bold());
    } else {
        println!("{}", "All done!".green().bold());
    }
    println!("  Downloaded: {}/{}", report.completed, report.total);
    println!("  Tagged: {}", report.tagged);
    if report.skipped > 0 {
        println!("  Skipped (no download link): {}", report.skipped);
    }
    if report.failed > 0 {
        println!("  {} {}", "Failed:".red(), report.failed);
    }
    if report.cancelled_tasks > 0 {
        println!("  Not started: {}", report.cancelled_tasks);
    }
}
