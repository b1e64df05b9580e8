use std::path::Path;

/// Characters that are not allowed in file names on at least one major platform
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum length of a sanitized file name, in characters
pub const MAX_FILENAME_CHARS: usize = 100;

/// Name used when sanitizing leaves nothing behind
pub const PLACEHOLDER_FILENAME: &str = "Unknown_Playlist";

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
///
/// Reserved characters become underscores, surrounding whitespace is stripped and the
/// result is capped at [`MAX_FILENAME_CHARS`] characters. Never returns an empty string.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect();

    // Truncation can expose trailing whitespace, so trim on both sides of it
    let truncated: String = replaced.trim().chars().take(MAX_FILENAME_CHARS).collect();
    let sanitized = truncated.trim();

    if sanitized.is_empty() {
        PLACEHOLDER_FILENAME.to_string()
    } else {
        sanitized.to_string()
    }
}

/// Size of a file on disk, if it can be read
pub fn file_size(path: &Path) -> Option<u64> {
    fs_err::metadata(path).ok().map(|metadata| metadata.len())
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp).await {
        missing.push(format!("{} - required for YouTube extraction", yt_dlp));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
