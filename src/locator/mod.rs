//! Classification of YouTube URLs into single videos and playlists.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::{FetchError, Result};

static ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%\?]{11})",
    )
    .expect("item pattern is valid")
});

static COLLECTION_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"[&?]list=([a-zA-Z0-9_-]+)").expect("list parameter pattern is valid"),
        Regex::new(r"youtube\.com/playlist\?list=([a-zA-Z0-9_-]+)")
            .expect("playlist page pattern is valid"),
        Regex::new(r"youtube\.com/watch\?.*list=([a-zA-Z0-9_-]+)")
            .expect("watch-with-list pattern is valid"),
    ]
});

/// What a locator points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    /// A single video
    SingleItem,
    /// A playlist
    Collection,
}

impl std::fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocatorKind::SingleItem => write!(f, "video"),
            LocatorKind::Collection => write!(f, "playlist"),
        }
    }
}

/// Check if the URL refers to a playlist
pub fn is_collection(locator: &str) -> bool {
    COLLECTION_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(locator))
}

/// Check if the URL has the shape of a YouTube video URL
pub fn is_item(locator: &str) -> bool {
    ITEM_PATTERN.is_match(locator)
}

/// Classify a locator. Playlist markers win over the video shape, so a
/// `watch?v=...&list=...` URL is treated as a playlist.
pub fn classify(locator: &str) -> Result<LocatorKind> {
    let locator = locator.trim();

    if is_collection(locator) {
        Ok(LocatorKind::Collection)
    } else if is_item(locator) {
        Ok(LocatorKind::SingleItem)
    } else {
        Err(FetchError::InvalidLocator(format!(
            "not a YouTube video or playlist URL: {}",
            locator
        )))
    }
}

/// Require a locator of a particular kind
pub fn expect_kind(locator: &str, expected: LocatorKind) -> Result<()> {
    let actual = classify(locator)?;
    if actual != expected {
        return Err(FetchError::InvalidLocator(format!(
            "expected a {} URL but got a {} URL: {}",
            expected, actual, locator
        )));
    }
    Ok(())
}

/// Extract the playlist identifier from a URL
pub fn playlist_id(locator: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(locator) {
        if let Some((_, id)) = parsed.query_pairs().find(|(key, _)| key == "list") {
            return Some(id.into_owned());
        }
    }

    // Scheme-less URLs don't parse, fall back to the pattern
    COLLECTION_PATTERNS[0]
        .captures(locator)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_single_items() {
        for url in [
            "https://www.youtube.com/watch?v=abc12345678",
            "https://youtu.be/dQw4w9WgXcQ",
            "http://youtube.com/embed/dQw4w9WgXcQ",
            "www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ",
        ] {
            assert_eq!(classify(url).unwrap(), LocatorKind::SingleItem, "{}", url);
        }
    }

    #[test]
    fn test_classify_collections() {
        for url in [
            "https://www.youtube.com/playlist?list=PL123",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLrAXtmRdnEQy6nuLMHjMZOz59Ys8KQJOx",
            "youtube.com/playlist?list=OLAK5uy_abc-123",
        ] {
            assert_eq!(classify(url).unwrap(), LocatorKind::Collection, "{}", url);
        }
    }

    #[test]
    fn test_classify_rejects_unrecognized() {
        for url in [
            "",
            "not a url",
            "https://vimeo.com/123456789",
            "https://www.youtube.com/",
            "https://twitter.com/user/status/123",
        ] {
            assert!(
                matches!(classify(url), Err(FetchError::InvalidLocator(_))),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_kinds_are_mutually_exclusive() {
        let urls = [
            "https://www.youtube.com/watch?v=abc12345678",
            "https://www.youtube.com/playlist?list=PL123",
            "https://www.youtube.com/watch?v=abc12345678&list=PL123",
            "https://youtu.be/abc12345678?list=PL123",
        ];
        for url in urls {
            let kind = classify(url).unwrap();
            assert_eq!(kind == LocatorKind::Collection, is_collection(url), "{}", url);
        }
    }

    #[test]
    fn test_expect_kind() {
        assert!(expect_kind("https://youtu.be/dQw4w9WgXcQ", LocatorKind::SingleItem).is_ok());
        let err = expect_kind("https://youtu.be/dQw4w9WgXcQ", LocatorKind::Collection)
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidLocator(_)));
        assert!(err.to_string().contains("expected a playlist URL"));
    }

    #[test]
    fn test_playlist_id() {
        assert_eq!(
            playlist_id("https://www.youtube.com/playlist?list=PL123"),
            Some("PL123".to_string())
        );
        assert_eq!(
            playlist_id("youtube.com/watch?v=abc12345678&list=PL_x-9"),
            Some("PL_x-9".to_string())
        );
        assert_eq!(playlist_id("https://youtu.be/dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
