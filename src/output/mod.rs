use anyhow::Result;
use std::fmt::Write;
use std::path::Path;

use crate::cli::SummaryFormat;
use crate::fetcher::CollectionDownloadReport;
use crate::utils::{file_size, format_file_size};

const RULE: &str = "==================================================";

/// Render the outcome of a single video download
pub fn render_item(path: &Path, format: &SummaryFormat) -> Result<String> {
    let size = file_size(path);

    let content = match format {
        SummaryFormat::Text => {
            let mut out = String::from("🎵 Download completed successfully!\n");
            write!(out, "File saved to: {}", path.display())?;
            if let Some(bytes) = size {
                write!(out, " ({})", format_file_size(bytes))?;
            }
            out
        }
        SummaryFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "status": "success",
            "output_path": path,
            "size_bytes": size,
        }))?,
    };

    Ok(content)
}

/// Render a playlist summary. The tally is always included, even when items failed.
pub fn render_report(report: &CollectionDownloadReport, format: &SummaryFormat) -> Result<String> {
    let content = match format {
        SummaryFormat::Text => {
            let mut out = String::new();
            writeln!(out, "{}", RULE)?;
            writeln!(out, "🎉 Playlist download completed: {}", report.collection.title)?;
            writeln!(
                out,
                "✅ Successfully downloaded: {}/{}",
                report.success_count, report.total_attempted
            )?;
            writeln!(out, "❌ Failed downloads: {}", report.failed_count())?;
            for failure in report.failures() {
                writeln!(
                    out,
                    "   • {}: {}",
                    failure.title.as_deref().unwrap_or(&failure.locator),
                    failure.error_message.as_deref().unwrap_or("unknown error")
                )?;
            }
            write!(out, "📁 Files saved to: {}", report.output_directory.display())?;
            out
        }
        SummaryFormat::Json => serde_json::to_string_pretty(report)?,
    };

    Ok(content)
}

/// Print a single video result to the console
pub fn print_item(path: &Path, format: &SummaryFormat) -> Result<()> {
    println!("{}", render_item(path, format)?);
    Ok(())
}

/// Print a playlist summary to the console
pub fn print_report(report: &CollectionDownloadReport, format: &SummaryFormat) -> Result<()> {
    println!("{}", render_report(report, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::CollectionDescriptor;
    use crate::fetcher::DownloadResult;
    use crate::FetchError;
    use std::path::PathBuf;

    fn report() -> CollectionDownloadReport {
        CollectionDownloadReport {
            collection: CollectionDescriptor {
                title: "Road Trip".to_string(),
                uploader: "DJ".to_string(),
                items: Vec::new(),
            },
            results: vec![
                DownloadResult::success(
                    "a",
                    Some("A".to_string()),
                    PathBuf::from("Road Trip/A.mp3"),
                ),
                DownloadResult::failure(
                    "b",
                    Some("B".to_string()),
                    &FetchError::Download("no .mp3 file found".to_string()),
                ),
            ],
            success_count: 1,
            total_attempted: 2,
            output_directory: PathBuf::from("downloads/Road Trip"),
            completed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_render_report_text_includes_tally_and_failures() {
        let text = render_report(&report(), &SummaryFormat::Text).unwrap();
        assert!(text.contains("Successfully downloaded: 1/2"));
        assert!(text.contains("Failed downloads: 1"));
        assert!(text.contains("B: Download failed: no .mp3 file found"));
        assert!(text.contains("downloads/Road Trip"));
    }

    #[test]
    fn test_render_report_json() {
        let json = render_report(&report(), &SummaryFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success_count"], 1);
        assert_eq!(value["total_attempted"], 2);
        assert_eq!(value["results"][1]["status"], "failed");
        assert_eq!(value["collection"]["title"], "Road Trip");
    }

    #[test]
    fn test_render_item_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        fs_err::write(&path, vec![0u8; 2048]).unwrap();

        let text = render_item(&path, &SummaryFormat::Text).unwrap();
        assert!(text.contains("song.mp3 (2.0 KB)"));

        let json = render_item(&path, &SummaryFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["size_bytes"], 2048);
    }
}
