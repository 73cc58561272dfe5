//! Quality presets: map a quality choice to a yt-dlp format selector.
//!
//! | Intent              | Selector                                              | Post-processing   |
//! |---------------------|-------------------------------------------------------|-------------------|
//! | `Best`              | `bestvideo+bestaudio/best`                            | -                 |
//! | `BestVideo`         | `bestvideo`                                           | -                 |
//! | `BestAudio`         | `bestaudio/best`                                      | -                 |
//! | `AudioOnly`         | `bestaudio/best`                                      | extract m4a @ 192 |
//! | `HeightCapped(720)` | `bestvideo[height<=720]+bestaudio/best[height<=720]`  | -                 |
//!
//! ```
//! use ytgrab_dl::format::{EngineConfig, QualityIntent};
//!
//! let config = EngineConfig::from(QualityIntent::HeightCapped(1080));
//! assert_eq!(config.format, "bestvideo[height<=1080]+bestaudio/best[height<=1080]");
//! ```

use crate::dl::{DownloadOptions, PostProcessor};
use crate::error::Error;
use std::str::FromStr;

const EXTRACT_AUDIO_CODEC: &str = "m4a";
const EXTRACT_AUDIO_QUALITY: &str = "192";

/// Retry count handed to yt-dlp for whole requests and for fragments.
pub const RETRIES: u32 = 10;

/// What the user wants downloaded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QualityIntent {
    /// Best video + best audio, merged
    Best,
    /// Best video-only stream (no audio)
    BestVideo,
    /// Best audio-only stream
    BestAudio,
    /// Best audio, converted to m4a after download
    AudioOnly,
    /// Best video + audio with height at most the given number of pixels
    HeightCapped(u32),
}

/// Format selector plus optional post-processing, derived from a [`QualityIntent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub format: String,
    pub postprocessor: Option<PostProcessor>,
}

impl From<QualityIntent> for EngineConfig {
    fn from(intent: QualityIntent) -> Self {
        let format = match intent {
            QualityIntent::Best => "bestvideo+bestaudio/best".to_string(),
            QualityIntent::BestVideo => "bestvideo".to_string(),
            QualityIntent::BestAudio | QualityIntent::AudioOnly => "bestaudio/best".to_string(),
            QualityIntent::HeightCapped(cap) => {
                format!("bestvideo[height<={cap}]+bestaudio/best[height<={cap}]")
            }
        };

        let postprocessor = match intent {
            QualityIntent::AudioOnly => Some(PostProcessor {
                key: "FFmpegExtractAudio".to_string(),
                preferredcodec: Some(EXTRACT_AUDIO_CODEC.to_string()),
                preferredquality: Some(EXTRACT_AUDIO_QUALITY.to_string()),
            }),
            _ => None,
        };

        Self {
            format,
            postprocessor,
        }
    }
}

impl From<QualityIntent> for DownloadOptions {
    /// Preset: the intent's selector, resumable downloads, 10 retries, warnings silenced
    fn from(intent: QualityIntent) -> Self {
        let EngineConfig {
            format,
            postprocessor,
        } = intent.into();

        Self {
            format: Some(format),
            postprocessors: postprocessor.map(|pp| vec![pp]),
            quiet: Some(false),
            no_warnings: Some(true),
            continuedl: Some(true),
            retries: Some(RETRIES),
            fragment_retries: Some(RETRIES),
            ..Default::default()
        }
    }
}

impl FromStr for QualityIntent {
    type Err = Error;

    /// Accepts `best`, `bestvideo`, `bestaudio`, `audio`, or a positive height such as `720`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(Self::Best),
            "bestvideo" => Ok(Self::BestVideo),
            "bestaudio" => Ok(Self::BestAudio),
            "audio" => Ok(Self::AudioOnly),
            _ => match s.parse::<u32>() {
                Ok(cap) if cap > 0 => Ok(Self::HeightCapped(cap)),
                _ => Err(Error::UnsupportedFormat(s.to_string())),
            },
        }
    }
}
