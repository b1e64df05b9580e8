//! tubetrack - A Rust CLI tool for downloading audio tracks from YouTube
//!
//! This library resolves YouTube video and playlist URLs through `yt-dlp`, retrieves the
//! best available audio for each item and has `ffmpeg` transcode it into a compressed
//! audio file. Playlists are processed sequentially with a courtesy delay between items.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod fetcher;
pub mod locator;
pub mod output;
pub mod tools;
pub mod utils;

pub use cli::{Cli, SummaryFormat};
pub use config::Config;
pub use extractors::{
    AudioFormat, CollectionDescriptor, CollectionEntry, CollectionListing, ItemDescriptor,
    MediaExtractor, RetrievalRequest,
};
pub use fetcher::{
    CollectionDownloadReport, DownloadResult, DownloadStatus, FetcherSettings, MediaFetcher,
};
pub use locator::LocatorKind;

/// Result type used throughout the library
pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// Error types specific to the fetcher
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// A required external tool could not be resolved. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid URL: {0}")]
    InvalidLocator(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Download failed: {0}")]
    Download(String),
}
