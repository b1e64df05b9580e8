//! External transcoder detection.

use std::path::{Path, PathBuf};

use crate::{FetchError, Result};

/// Name of the transcoder executable on the search path
pub const TRANSCODER: &str = "ffmpeg";

/// Well-known install locations, tried when the search path has no transcoder
#[cfg(target_os = "windows")]
pub const CANDIDATE_PATHS: &[&str] = &[
    r"C:\ffmpeg\bin\ffmpeg.exe",
    r"C:\Program Files\ffmpeg\bin\ffmpeg.exe",
];

#[cfg(target_os = "macos")]
pub const CANDIDATE_PATHS: &[&str] = &[
    "/opt/homebrew/bin/ffmpeg",
    "/usr/local/bin/ffmpeg",
    "/usr/bin/ffmpeg",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const CANDIDATE_PATHS: &[&str] = &["/usr/bin/ffmpeg", "/usr/local/bin/ffmpeg"];

const INSTALL_HINT: &str = "Please install FFmpeg:\n\
    • macOS: brew install ffmpeg\n\
    • Ubuntu/Debian: sudo apt install ffmpeg\n\
    • Windows: Download from https://ffmpeg.org/download.html\n\
    Make sure FFmpeg is in your system PATH.";

/// Locate the transcoder.
///
/// Order: the configured path (if it exists), the system search path, then
/// [`CANDIDATE_PATHS`].
///
/// # Errors
///
/// Returns [`FetchError::Configuration`] if nothing resolves.
pub fn locate_transcoder(configured: Option<&Path>) -> Result<PathBuf> {
    locate_with(configured, TRANSCODER, CANDIDATE_PATHS)
}

fn locate_with(configured: Option<&Path>, name: &str, candidates: &[&str]) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured transcoder {} does not exist, searching instead",
            path.display()
        );
    }

    if let Ok(path) = which::which(name) {
        tracing::debug!("Found {} on PATH: {}", name, path.display());
        return Ok(path);
    }

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .inspect(|path| tracing::debug!("Found {} at {}", name, path.display()))
        .ok_or_else(|| {
            FetchError::Configuration(format!("{} not found. {}", name, INSTALL_HINT))
        })
}
