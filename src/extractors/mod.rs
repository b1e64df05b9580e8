use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod youtube;

pub use youtube::YtDlpExtractor;

use crate::Result;

/// Metadata about a single video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// URL of the video
    pub locator: String,

    /// Title of the video
    pub title: String,

    /// Duration in whole seconds (0 if unknown)
    pub duration_seconds: u64,

    /// Channel or user that uploaded the video
    pub uploader: String,
}

/// One entry of a playlist as reported by the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEntry {
    Available(ItemDescriptor),
    /// Private, deleted or otherwise unplayable video
    Unavailable,
}

/// Raw playlist listing, before unavailable entries are dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionListing {
    pub title: String,
    pub uploader: String,
    pub entries: Vec<CollectionEntry>,
}

/// Playlist metadata with its videos in playlist order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    pub title: String,
    pub uploader: String,
    pub items: Vec<ItemDescriptor>,
}

impl From<CollectionListing> for CollectionDescriptor {
    fn from(listing: CollectionListing) -> Self {
        let items = listing
            .entries
            .into_iter()
            .filter_map(|entry| match entry {
                CollectionEntry::Available(item) => Some(item),
                CollectionEntry::Unavailable => None,
            })
            .collect();

        Self {
            title: listing.title,
            uploader: listing.uploader,
            items,
        }
    }
}

/// Target audio formats the transcoder can produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Opus,
    Vorbis,
    Flac,
    Wav,
}

impl AudioFormat {
    /// Codec name understood by `yt-dlp --audio-format`
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Vorbis => "vorbis",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    /// File extension of the transcoded output
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Vorbis => "ogg",
            other => other.as_str(),
        }
    }

    /// Whether the format takes a bitrate at all
    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioFormat::Flac | AudioFormat::Wav)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the extractor needs to retrieve and transcode one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    /// Format selector, e.g. `bestaudio/best`
    pub format: String,

    /// Output template; `%(ext)s` is filled in by the extractor
    pub output_template: PathBuf,

    /// Codec to transcode into
    pub audio_format: AudioFormat,

    /// Target bitrate in kbps (ignored for lossless formats)
    pub audio_quality: u32,

    /// Location of the transcoder binary
    pub transcoder: PathBuf,
}

impl RetrievalRequest {
    /// Best-audio request writing `{directory}/{stem}.%(ext)s`
    pub fn best_audio(
        directory: &Path,
        stem: &str,
        audio_format: AudioFormat,
        audio_quality: u32,
        transcoder: &Path,
    ) -> Self {
        Self {
            format: "bestaudio/best".to_string(),
            output_template: directory.join(format!("{}.%(ext)s", stem)),
            audio_format,
            audio_quality,
            transcoder: transcoder.to_path_buf(),
        }
    }
}

/// Narrow interface to the external metadata/retrieval tool
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Fetch video metadata without downloading any media
    async fn fetch_item(&self, locator: &str) -> Result<ItemDescriptor>;

    /// Enumerate a playlist without resolving each video
    async fn fetch_collection(&self, locator: &str) -> Result<CollectionListing>;

    /// Retrieve the audio of a video and transcode it as requested
    async fn retrieve_audio(&self, locator: &str, request: &RetrievalRequest) -> Result<()>;

    /// Get the name of the tool behind this extractor
    fn tool_name(&self) -> &'static str;
}
