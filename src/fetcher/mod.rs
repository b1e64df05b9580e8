use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config::Config;
use crate::extractors::{
    AudioFormat, CollectionDescriptor, ItemDescriptor, MediaExtractor, RetrievalRequest,
};
use crate::locator::{self, LocatorKind};
use crate::tools;
use crate::utils::{format_duration, sanitize_filename};
use crate::{FetchError, Result};

pub mod report;

pub use report::{CollectionDownloadReport, DownloadResult, DownloadStatus};

/// Settings that stay fixed for the lifetime of a fetcher
#[derive(Debug, Clone)]
pub struct FetcherSettings {
    /// Root directory for downloaded audio
    pub output_directory: PathBuf,

    /// Codec the transcoder produces
    pub audio_format: AudioFormat,

    /// Target bitrate in kbps
    pub audio_quality: u32,

    /// Show a spinner while yt-dlp is running
    pub show_progress: bool,
}

impl From<&Config> for FetcherSettings {
    fn from(config: &Config) -> Self {
        Self {
            output_directory: config.download.output_directory.clone(),
            audio_format: config.download.audio_format,
            audio_quality: config.download.audio_quality,
            show_progress: true,
        }
    }
}

/// Downloads audio for videos and playlists through a [`MediaExtractor`].
///
/// Every operation runs its external calls one after another. The fallback
/// output scan in [`MediaFetcher::download_item`] relies on that: no two
/// downloads may target the same directory at the same time.
pub struct MediaFetcher<E> {
    extractor: E,
    settings: FetcherSettings,
    transcoder: PathBuf,
}

impl<E: MediaExtractor> MediaFetcher<E> {
    /// Create a fetcher, searching for the transcoder.
    ///
    /// Fails with [`FetchError::Configuration`] if no transcoder is found or the
    /// output directory cannot be created.
    pub fn new(extractor: E, settings: FetcherSettings, transcoder: Option<&Path>) -> Result<Self> {
        let transcoder = tools::locate_transcoder(transcoder)?;
        Self::with_transcoder(extractor, settings, transcoder)
    }

    /// Create a fetcher with an already resolved transcoder
    pub fn with_transcoder(
        extractor: E,
        settings: FetcherSettings,
        transcoder: PathBuf,
    ) -> Result<Self> {
        ensure_directory(&settings.output_directory)?;
        tracing::debug!(
            "Output directory {}, transcoder {}",
            settings.output_directory.display(),
            transcoder.display()
        );

        Ok(Self {
            extractor,
            settings,
            transcoder,
        })
    }

    pub fn output_directory(&self) -> &Path {
        &self.settings.output_directory
    }

    pub fn transcoder(&self) -> &Path {
        &self.transcoder
    }

    /// Decide whether a URL is a single video or a playlist
    pub fn classify_locator(&self, locator: &str) -> Result<LocatorKind> {
        locator::classify(locator)
    }

    /// Fetch video metadata without downloading anything
    pub async fn fetch_item_descriptor(&self, locator: &str) -> Result<ItemDescriptor> {
        self.extractor
            .fetch_item(locator)
            .await
            .map_err(|e| as_extraction_error(e, "failed to get video info"))
    }

    /// Enumerate a playlist, dropping private and deleted videos
    pub async fn fetch_collection_descriptor(&self, locator: &str) -> Result<CollectionDescriptor> {
        locator::expect_kind(locator, LocatorKind::Collection)?;

        if let Some(id) = locator::playlist_id(locator) {
            tracing::debug!("Playlist id: {}", id);
        }

        let listing = self
            .extractor
            .fetch_collection(locator)
            .await
            .map_err(|e| as_extraction_error(e, "failed to get playlist info"))?;

        if listing.entries.is_empty() {
            return Err(FetchError::Extraction(
                "no videos found in playlist".to_string(),
            ));
        }

        let listed = listing.entries.len();
        let descriptor = CollectionDescriptor::from(listing);
        let skipped = listed - descriptor.items.len();
        if skipped > 0 {
            tracing::info!("Skipping {} unavailable videos", skipped);
        }

        Ok(descriptor)
    }

    /// Download the audio of one video into the output directory
    pub async fn download_item(
        &self,
        locator: &str,
        output_filename: Option<&str>,
    ) -> Result<PathBuf> {
        self.download_item_into(locator, output_filename, &self.settings.output_directory)
            .await
    }

    /// Download several videos one after another, recording failures instead of stopping
    pub async fn download_many<S: AsRef<str>>(&self, locators: &[S]) -> Vec<DownloadResult> {
        let mut results = Vec::with_capacity(locators.len());

        for (index, locator) in locators.iter().enumerate() {
            let locator = locator.as_ref();
            tracing::info!("[{}/{}] Processing: {}", index + 1, locators.len(), locator);

            match self.download_item(locator, None).await {
                Ok(path) => results.push(DownloadResult::success(locator, None, path)),
                Err(e) => {
                    tracing::warn!("Failed to download {}: {}", locator, e);
                    results.push(DownloadResult::failure(locator, None, &e));
                }
            }
        }

        results
    }

    /// Download a playlist into its own subdirectory.
    ///
    /// At most `max_items` videos are attempted (no cap if `None` or zero), in
    /// playlist order, with `delay` between consecutive attempts. Individual
    /// failures are recorded in the report and never stop the loop.
    pub async fn download_collection(
        &self,
        locator: &str,
        max_items: Option<usize>,
        delay: Duration,
    ) -> Result<CollectionDownloadReport> {
        locator::expect_kind(locator, LocatorKind::Collection)?;

        tracing::info!("Analyzing playlist: {}", locator);
        let collection = self.fetch_collection_descriptor(locator).await?;
        tracing::info!(
            "Playlist: {} by {} ({} videos)",
            collection.title,
            collection.uploader,
            collection.items.len()
        );

        let limit = match max_items {
            Some(max) if max > 0 => {
                tracing::info!("Limiting download to first {} videos", max);
                max.min(collection.items.len())
            }
            _ => collection.items.len(),
        };

        let directory = self
            .settings
            .output_directory
            .join(sanitize_filename(&collection.title));
        ensure_directory(&directory)?;
        tracing::info!("Saving {} videos to {}", limit, directory.display());

        let mut results = Vec::with_capacity(limit);
        for (index, item) in collection.items[..limit].iter().enumerate() {
            tracing::info!(
                "[{}/{}] {} ({})",
                index + 1,
                limit,
                item.title,
                format_duration(item.duration_seconds)
            );

            let result = match self.download_item_into(&item.locator, None, &directory).await {
                Ok(path) => DownloadResult::success(&item.locator, Some(item.title.clone()), path),
                Err(e) => {
                    tracing::warn!("Failed to download {}: {}", item.title, e);
                    DownloadResult::failure(&item.locator, Some(item.title.clone()), &e)
                }
            };
            results.push(result);

            if !delay.is_zero() && index + 1 < limit {
                tracing::debug!("Waiting {:.1} seconds", delay.as_secs_f64());
                tokio::time::sleep(delay).await;
            }
        }

        Ok(CollectionDownloadReport::new(collection, results, directory))
    }

    async fn download_item_into(
        &self,
        locator: &str,
        output_filename: Option<&str>,
        directory: &Path,
    ) -> Result<PathBuf> {
        locator::expect_kind(locator, LocatorKind::SingleItem)?;

        let item = self.fetch_item_descriptor(locator).await?;
        tracing::info!("Downloading: {} (uploader: {})", item.title, item.uploader);

        let extension = self.settings.audio_format.extension();
        let stem = match output_filename {
            Some(name) => sanitize_filename(strip_extension(name, extension)),
            None => sanitize_filename(&item.title),
        };
        let expected = directory.join(format!("{}.{}", stem, extension));
        tracing::debug!("Expected output: {}", expected.display());

        let request = RetrievalRequest::best_audio(
            directory,
            &stem,
            self.settings.audio_format,
            self.settings.audio_quality,
            &self.transcoder,
        );

        let progress = self.spinner(format!(
            "Downloading audio with {}...",
            self.extractor.tool_name()
        ));
        let retrieved = self.extractor.retrieve_audio(locator, &request).await;
        progress.finish_and_clear();

        retrieved.map_err(|e| match e {
            FetchError::Download(_) => e,
            other => FetchError::Download(other.to_string()),
        })?;

        if expected.exists() {
            return Ok(expected);
        }

        // yt-dlp may normalize the name on its own, take the newest matching file
        tracing::debug!(
            "Expected file not found, searching {} for .{} files",
            directory.display(),
            extension
        );
        find_latest_with_extension(directory, extension)?
            .inspect(|path| tracing::info!("Found audio file: {}", path.display()))
            .ok_or_else(|| {
                FetchError::Download(format!(
                    "no .{} file found in {}",
                    extension,
                    directory.display()
                ))
            })
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}

fn as_extraction_error(error: FetchError, context: &str) -> FetchError {
    match error {
        FetchError::Extraction(_) => error,
        other => FetchError::Extraction(format!("{}: {}", context, other)),
    }
}

/// Create a directory (and parents) if it does not exist yet
fn ensure_directory(path: &Path) -> Result<()> {
    fs_err::create_dir_all(path).map_err(|e| {
        FetchError::Configuration(format!("cannot create output directory: {}", e))
    })
}

/// Drop a trailing `.{extension}` (any case) from a user supplied name
fn strip_extension<'a>(name: &'a str, extension: &str) -> &'a str {
    let suffix_len = extension.len() + 1;
    if name.len() > suffix_len && name.is_char_boundary(name.len() - suffix_len) {
        let (stem, suffix) = name.split_at(name.len() - suffix_len);
        if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(extension) {
            return stem;
        }
    }
    name
}

/// Newest file in `directory` with the given extension, by creation time
/// (modification time where the platform does not record creation).
fn find_latest_with_extension(directory: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let entries = fs_err::read_dir(directory)
        .map_err(|e| FetchError::Download(format!("cannot scan output directory: {}", e)))?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let Ok(stamp) = metadata.created().or_else(|_| metadata.modified()) else {
            continue;
        };
        if latest.as_ref().map_or(true, |(newest, _)| stamp >= *newest) {
            latest = Some((stamp, path));
        }
    }

    Ok(latest.map(|(_, path)| path))
}
