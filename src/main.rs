use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubetrack::extractors::YtDlpExtractor;
use tubetrack::{locator, output, utils, Cli, Config, FetcherSettings, MediaFetcher};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "tubetrack=debug"
    } else {
        "tubetrack=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let outcome = tokio::select! {
        result = run(cli) => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\n⏹️  Download cancelled by user");
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(directory) = cli.directory.clone() {
        config.download.output_directory = directory;
    }
    if let Some(format) = cli.audio_format.clone() {
        config.download.audio_format = format;
    }
    if let Some(quality) = cli.audio_quality.clone() {
        config.download.audio_quality = quality;
    }
    if let Some(delay) = cli.delay {
        config.download.delay_seconds = delay;
    }
    if cli.ffmpeg.is_some() {
        config.tools.ffmpeg = cli.ffmpeg.clone();
    }
    config.validate()?;

    // Missing yt-dlp is only a warning, it may still resolve at download time
    let missing_deps = utils::check_dependencies(&config.tools.yt_dlp).await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let extractor = YtDlpExtractor::with_path(config.tools.yt_dlp.clone());
    let settings = FetcherSettings {
        show_progress: !cli.quiet,
        ..FetcherSettings::from(&config)
    };
    let fetcher = MediaFetcher::new(extractor, settings, config.tools.ffmpeg.as_deref())?;

    let is_playlist = cli.playlist || locator::is_collection(&cli.url);

    if is_playlist {
        if cli.output.is_some() {
            eprintln!("⚠️  Warning: --output option is ignored for playlists");
        }

        let delay = Duration::from_secs_f64(config.download.delay_seconds);
        let report = fetcher
            .download_collection(&cli.url, cli.max_videos, delay)
            .await
            .context("Playlist download failed")?;

        output::print_report(&report, &cli.format)?;
    } else {
        if cli.max_videos.is_some() {
            eprintln!("⚠️  Warning: --max-videos option is ignored for single videos");
        }
        if cli.delay_overridden() {
            eprintln!("⚠️  Warning: --delay option is ignored for single videos");
        }

        tracing::info!("Starting download for URL: {}", cli.url);
        let path = fetcher.download_item(&cli.url, cli.output.as_deref()).await?;

        output::print_item(&path, &cli.format)?;
    }

    Ok(())
}
