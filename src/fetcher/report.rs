use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extractors::CollectionDescriptor;
use crate::FetchError;

/// Outcome of a single download attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Success,
    Failed,
}

/// Result of one attempted video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    /// URL that was attempted
    pub locator: String,

    /// Title, when it was known before the attempt
    pub title: Option<String>,

    /// Where the audio ended up
    pub output_path: Option<PathBuf>,

    pub status: DownloadStatus,

    /// Why the attempt failed
    pub error_message: Option<String>,
}

impl DownloadResult {
    pub fn success(locator: &str, title: Option<String>, output_path: PathBuf) -> Self {
        Self {
            locator: locator.to_string(),
            title,
            output_path: Some(output_path),
            status: DownloadStatus::Success,
            error_message: None,
        }
    }

    pub fn failure(locator: &str, title: Option<String>, error: &FetchError) -> Self {
        Self {
            locator: locator.to_string(),
            title,
            output_path: None,
            status: DownloadStatus::Failed,
            error_message: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DownloadStatus::Success
    }
}

/// Summary of a playlist download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDownloadReport {
    /// The playlist as enumerated, before any `max_items` cap
    pub collection: CollectionDescriptor,

    /// One entry per attempted video, in playlist order
    pub results: Vec<DownloadResult>,

    pub success_count: usize,

    pub total_attempted: usize,

    /// Playlist subdirectory the files were written to
    pub output_directory: PathBuf,

    /// Timestamp when the last attempt finished
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl CollectionDownloadReport {
    pub(crate) fn new(
        collection: CollectionDescriptor,
        results: Vec<DownloadResult>,
        output_directory: PathBuf,
    ) -> Self {
        let success_count = results.iter().filter(|r| r.is_success()).count();
        let total_attempted = results.len();

        Self {
            collection,
            results,
            success_count,
            total_attempted,
            output_directory,
            completed_at: chrono::Utc::now(),
        }
    }

    /// Number of attempted videos that failed
    pub fn failed_count(&self) -> usize {
        self.total_attempted - self.success_count
    }

    /// Results of the failed attempts
    pub fn failures(&self) -> impl Iterator<Item = &DownloadResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let collection = CollectionDescriptor {
            title: "Mix".to_string(),
            uploader: "Someone".to_string(),
            items: Vec::new(),
        };
        let results = vec![
            DownloadResult::success("a", None, PathBuf::from("Mix/a.mp3")),
            DownloadResult::failure("b", None, &FetchError::Download("boom".to_string())),
            DownloadResult::success("c", Some("C".to_string()), PathBuf::from("Mix/c.mp3")),
        ];

        let report = CollectionDownloadReport::new(collection, results, PathBuf::from("Mix"));
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.total_attempted, 3);
        assert_eq!(report.failures().next().unwrap().locator, "b");
        assert_eq!(
            report.failures().next().unwrap().error_message.as_deref(),
            Some("Download failed: boom")
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&DownloadStatus::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
    }
}
