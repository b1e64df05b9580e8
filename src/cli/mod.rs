use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_DELAY_SECONDS;
use crate::extractors::AudioFormat;

#[derive(Parser, Debug)]
#[command(
    name = "tubetrack",
    about = "Download audio from YouTube videos or playlists",
    version,
    long_about = "Download audio from YouTube videos or playlists. Uses yt-dlp to fetch the best available audio and ffmpeg to convert it (MP3 by default).",
    after_help = "Examples:\n  \
        tubetrack \"https://www.youtube.com/watch?v=dQw4w9WgXcQ\"\n  \
        tubetrack -o \"my_song.mp3\" \"https://youtu.be/dQw4w9WgXcQ\"\n  \
        tubetrack --playlist --max-videos 10 \"https://www.youtube.com/playlist?list=PLrAXtmRdnEQy6nuLMHjMZOz59Ys8KQJOx\"\n  \
        tubetrack --delay 2 \"https://www.youtube.com/playlist?list=PLrAXtmRdnEQy6nuLMHjMZOz59Ys8KQJOx\""
)]
pub struct Cli {
    /// YouTube video or playlist URL to download audio from
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output filename (only for single videos, default: uses video title)
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Output directory [default: downloads]
    #[arg(short, long, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Download entire playlist (auto-detected if URL contains a playlist)
    #[arg(long)]
    pub playlist: bool,

    /// Maximum number of videos to download from a playlist
    #[arg(long, value_name = "N")]
    pub max_videos: Option<usize>,

    /// Delay between playlist downloads in seconds [default: 1.0]
    #[arg(long, value_name = "SECONDS", value_parser = parse_delay)]
    pub delay: Option<f64>,

    /// Audio format to convert to (overrides config)
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub audio_format: Option<AudioFormat>,

    /// Audio bitrate in kbps (overrides config)
    #[arg(long, value_name = "KBPS", value_parser = clap::value_parser!(u32).range(1..))]
    pub audio_quality: Option<u32>,

    /// Path to the ffmpeg binary (searched for if not given)
    #[arg(long, value_name = "PATH", env = "TUBETRACK_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: SummaryFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// True when `--delay` was given with something other than the default
    pub fn delay_overridden(&self) -> bool {
        self.delay.is_some_and(|delay| delay != DEFAULT_DELAY_SECONDS)
    }
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum SummaryFormat {
    /// Human readable text
    Text,
    /// JSON document
    Json,
}

fn parse_delay(value: &str) -> Result<f64, String> {
    let delay: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", value))?;

    if !delay.is_finite() || delay < 0.0 {
        return Err(format!("delay must be zero or positive, got {}", value));
    }

    Ok(delay)
}
