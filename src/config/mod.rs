use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::extractors::AudioFormat;

/// Pause between playlist downloads when neither the config file nor the CLI sets one
pub const DEFAULT_DELAY_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Download settings
    pub download: DownloadConfig,

    /// External tool locations
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Root directory for downloaded audio
    pub output_directory: PathBuf,

    /// Codec the transcoder produces
    pub audio_format: AudioFormat,

    /// Target bitrate in kbps
    pub audio_quality: u32,

    /// Pause between playlist items, in seconds
    pub delay_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// yt-dlp executable name or path
    pub yt_dlp: String,

    /// Explicit ffmpeg location (searched for if unset)
    pub ffmpeg: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("downloads"),
            audio_format: AudioFormat::Mp3,
            audio_quality: 192,
            delay_seconds: DEFAULT_DELAY_SECONDS,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: "yt-dlp".to_string(),
            ffmpeg: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("tubetrack").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.download.audio_quality == 0 {
            anyhow::bail!("audio_quality must be a positive bitrate in kbps");
        }

        if !self.download.delay_seconds.is_finite() || self.download.delay_seconds < 0.0 {
            anyhow::bail!(
                "delay_seconds must be zero or positive, got {}",
                self.download.delay_seconds
            );
        }

        if self.tools.yt_dlp.trim().is_empty() {
            anyhow::bail!("tools.yt_dlp must not be empty");
        }

        Ok(())
    }
}
