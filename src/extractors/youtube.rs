use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

use super::{CollectionEntry, CollectionListing, ItemDescriptor, MediaExtractor, RetrievalRequest};
use crate::locator::watch_url;
use crate::{FetchError, Result};

const UNKNOWN: &str = "Unknown";

/// Titles yt-dlp reports for playlist slots that can no longer be played
const UNAVAILABLE_TITLES: &[&str] = &["[Private video]", "[Deleted video]"];

/// Video metadata as printed by `yt-dlp --dump-json`
#[derive(Debug, Deserialize)]
struct VideoJson {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    channel: Option<String>,
    webpage_url: Option<String>,
}

/// Playlist metadata as printed by `yt-dlp --flat-playlist --dump-single-json`
#[derive(Debug, Deserialize)]
struct PlaylistJson {
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    entries: Option<Vec<Option<VideoJson>>>,
}

/// YouTube audio extractor using yt-dlp
pub struct YtDlpExtractor {
    yt_dlp_path: String,
}

impl YtDlpExtractor {
    pub fn new() -> Self {
        Self::with_path("yt-dlp")
    }

    /// Use a specific yt-dlp executable
    pub fn with_path(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
        }
    }

    /// Run yt-dlp and return its stdout, mapping failures with `on_error`
    async fn run(&self, args: &[String], on_error: fn(String) -> FetchError) -> Result<Vec<u8>> {
        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| on_error(format!("failed to run {}: {}", self.yt_dlp_path, e)))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(on_error(format!(
                "{} exited with {}: {}",
                self.yt_dlp_path,
                output.status,
                error.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Arguments for dumping a single video's metadata
fn item_args(locator: &str) -> Vec<String> {
    [
        "--dump-json",
        "--no-playlist",
        "--no-warnings",
        "--",
        locator,
    ]
    .map(String::from)
    .to_vec()
}

/// Arguments for listing a playlist without resolving each entry
fn listing_args(locator: &str) -> Vec<String> {
    [
        "--flat-playlist",
        "--dump-single-json",
        "--no-warnings",
        "--",
        locator,
    ]
    .map(String::from)
    .to_vec()
}

/// Build the yt-dlp arguments for a retrieval request
fn retrieval_args(locator: &str, request: &RetrievalRequest) -> Vec<String> {
    let mut args = vec![
        "--no-playlist".to_string(),
        "--newline".to_string(),
        "--format".to_string(),
        request.format.clone(),
        "--output".to_string(),
        request.output_template.to_string_lossy().into_owned(),
        // Post-process: hand the download to the transcoder
        "--extract-audio".to_string(),
        "--audio-format".to_string(),
        request.audio_format.as_str().to_string(),
    ];

    if !request.audio_format.is_lossless() {
        args.push("--audio-quality".to_string());
        args.push(format!("{}K", request.audio_quality));
    }

    args.push("--ffmpeg-location".to_string());
    args.push(request.transcoder.to_string_lossy().into_owned());
    // The locator is user input and must never be read as an option
    args.push("--".to_string());
    args.push(locator.to_string());
    args
}

fn item_from_json(video: VideoJson, fallback_locator: &str) -> ItemDescriptor {
    let locator = video
        .webpage_url
        .or_else(|| video.id.as_deref().map(watch_url))
        .unwrap_or_else(|| fallback_locator.to_string());

    ItemDescriptor {
        locator,
        title: video.title.unwrap_or_else(|| UNKNOWN.to_string()),
        duration_seconds: video
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d as u64)
            .unwrap_or(0),
        uploader: video
            .uploader
            .or(video.channel)
            .unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

/// Parse the `--dump-json` output for a single video
fn parse_item(json: &[u8], locator: &str) -> Result<ItemDescriptor> {
    let video: VideoJson = serde_json::from_slice(json)
        .map_err(|e| FetchError::Extraction(format!("malformed video metadata: {}", e)))?;

    Ok(item_from_json(video, locator))
}

fn entry_from_json(entry: Option<VideoJson>) -> CollectionEntry {
    let Some(video) = entry else {
        return CollectionEntry::Unavailable;
    };

    let is_placeholder = video
        .title
        .as_deref()
        .is_some_and(|title| UNAVAILABLE_TITLES.contains(&title));

    match video.id.clone() {
        Some(id) if !is_placeholder && !id.is_empty() => {
            // Flat entries carry no reliable page url, always use the canonical form
            let mut item = item_from_json(video, &id);
            item.locator = watch_url(&id);
            CollectionEntry::Available(item)
        }
        _ => CollectionEntry::Unavailable,
    }
}

/// Parse the flat `--dump-single-json` output for a playlist
fn parse_listing(json: &[u8]) -> Result<CollectionListing> {
    let playlist: PlaylistJson = serde_json::from_slice(json)
        .map_err(|e| FetchError::Extraction(format!("malformed playlist metadata: {}", e)))?;

    let entries: Vec<CollectionEntry> = playlist
        .entries
        .unwrap_or_default()
        .into_iter()
        .map(entry_from_json)
        .collect();

    if entries.is_empty() {
        return Err(FetchError::Extraction("no videos found in playlist".to_string()));
    }

    Ok(CollectionListing {
        title: playlist.title.unwrap_or_else(|| "Unknown Playlist".to_string()),
        uploader: playlist
            .uploader
            .or(playlist.channel)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        entries,
    })
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn fetch_item(&self, locator: &str) -> Result<ItemDescriptor> {
        tracing::debug!("Extracting video info for: {}", locator);

        let stdout = self.run(&item_args(locator), FetchError::Extraction).await?;

        parse_item(&stdout, locator)
    }

    async fn fetch_collection(&self, locator: &str) -> Result<CollectionListing> {
        tracing::debug!("Extracting playlist info for: {}", locator);

        let stdout = self.run(&listing_args(locator), FetchError::Extraction).await?;

        parse_listing(&stdout)
    }

    async fn retrieve_audio(&self, locator: &str, request: &RetrievalRequest) -> Result<()> {
        tracing::debug!(
            "Downloading {} audio for: {}",
            request.audio_format,
            locator
        );

        self.run(&retrieval_args(locator, request), FetchError::Download)
            .await
            .map(|_| ())
    }

    fn tool_name(&self) -> &'static str {
        "yt-dlp"
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::AudioFormat;
    use std::path::Path;

    #[test]
    fn test_parse_item() {
        let json = br#"{
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "duration": 212.0,
            "uploader": "Rick Astley",
            "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "formats": []
        }"#;

        let item = parse_item(json, "https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(item.title, "Never Gonna Give You Up");
        assert_eq!(item.duration_seconds, 212);
        assert_eq!(item.uploader, "Rick Astley");
        assert_eq!(item.locator, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_parse_item_defaults_missing_fields() {
        let item = parse_item(br#"{"duration": null}"#, "https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(item.title, "Unknown");
        assert_eq!(item.uploader, "Unknown");
        assert_eq!(item.duration_seconds, 0);
        assert_eq!(item.locator, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_parse_item_rejects_garbage() {
        let err = parse_item(b"ERROR: not json", "x").unwrap_err();
        assert!(matches!(err, FetchError::Extraction(_)));
    }

    #[test]
    fn test_parse_listing_marks_unavailable_entries() {
        let json = br#"{
            "_type": "playlist",
            "title": "Road Trip",
            "channel": "DJ Someone",
            "entries": [
                {"id": "aaaaaaaaaaa", "title": "First", "duration": 100, "url": "aaaaaaaaaaa"},
                null,
                {"id": "bbbbbbbbbbb", "title": "[Private video]", "duration": null},
                {"title": "No id"},
                {"id": "ccccccccccc", "title": "[Deleted video]"},
                {"id": "ddddddddddd", "title": "Last", "uploader": "Guest"}
            ]
        }"#;

        let listing = parse_listing(json).unwrap();
        assert_eq!(listing.title, "Road Trip");
        assert_eq!(listing.uploader, "DJ Someone");
        assert_eq!(listing.entries.len(), 6);
        assert_eq!(
            listing.entries[0],
            CollectionEntry::Available(ItemDescriptor {
                locator: "https://www.youtube.com/watch?v=aaaaaaaaaaa".to_string(),
                title: "First".to_string(),
                duration_seconds: 100,
                uploader: "Unknown".to_string(),
            })
        );
        for index in 1..=4 {
            assert_eq!(listing.entries[index], CollectionEntry::Unavailable);
        }
        match &listing.entries[5] {
            CollectionEntry::Available(item) => assert_eq!(item.uploader, "Guest"),
            CollectionEntry::Unavailable => panic!("last entry should be available"),
        }
    }

    #[test]
    fn test_parse_listing_without_entries_fails() {
        let cases: [&[u8]; 2] = [br#"{"title": "Empty", "entries": []}"#, br#"{"title": "Empty"}"#];
        for json in cases {
            let err = parse_listing(json).unwrap_err();
            assert!(matches!(err, FetchError::Extraction(_)));
        }
    }

    #[test]
    fn test_retrieval_args() {
        let request = RetrievalRequest::best_audio(
            Path::new("out"),
            "Song",
            AudioFormat::Mp3,
            192,
            Path::new("/usr/bin/ffmpeg"),
        );
        let args = retrieval_args("https://youtu.be/dQw4w9WgXcQ", &request);

        let position = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[position("--format") + 1], "bestaudio/best");
        assert_eq!(args[position("--audio-format") + 1], "mp3");
        assert_eq!(args[position("--audio-quality") + 1], "192K");
        assert_eq!(args[position("--ffmpeg-location") + 1], "/usr/bin/ffmpeg");
        assert!(args.contains(&"--extract-audio".to_string()));
        assert_eq!(args.last().unwrap(), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_locator_follows_end_of_options_marker() {
        let locator = "--exec=touch pwned?list=x";
        let request = RetrievalRequest::best_audio(
            Path::new("out"),
            "Song",
            AudioFormat::Mp3,
            192,
            Path::new("ffmpeg"),
        );

        for args in [
            item_args(locator),
            listing_args(locator),
            retrieval_args(locator, &request),
        ] {
            let marker = args.iter().position(|a| a == "--").unwrap();
            assert_eq!(&args[marker + 1..], [locator.to_string()]);
        }
    }

    #[test]
    fn test_retrieval_args_lossless_has_no_bitrate() {
        let request = RetrievalRequest::best_audio(
            Path::new("out"),
            "Song",
            AudioFormat::Flac,
            192,
            Path::new("ffmpeg"),
        );
        let args = retrieval_args("https://youtu.be/dQw4w9WgXcQ", &request);
        assert!(!args.contains(&"--audio-quality".to_string()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_extraction_error() {
        let extractor = YtDlpExtractor::with_path("nonexistent_tool_12345");
        let err = extractor
            .fetch_item("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Extraction(_)));
    }
}
