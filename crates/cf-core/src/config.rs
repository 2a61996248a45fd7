//! Application configuration types.
//!
//! The top-level [`Config`] struct carries the sub-configs for tool
//! discovery, transition merges and single-clip audio operations. Every
//! section defaults sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub merge: MergeConfig,
    pub audio: AudioConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (name, path) in [
            ("tools.ffmpeg_path", &self.tools.ffmpeg_path),
            ("tools.ffprobe_path", &self.tools.ffprobe_path),
        ] {
            if let Some(p) = path {
                if !p.exists() {
                    warnings.push(format!(
                        "{name} '{}' does not exist; falling back to PATH",
                        p.display()
                    ));
                }
            }
        }

        let fade = self.merge.fade_duration_secs;
        if !fade.is_finite() || fade <= 0.0 {
            warnings.push(format!(
                "merge.fade_duration_secs is {fade}; merges will be rejected until it is positive"
            ));
        }

        if self.merge.timeout_secs == Some(0) {
            warnings.push("merge.timeout_secs is 0; every merge will time out".into());
        }
        if self.audio.timeout_secs == Some(0) {
            warnings.push("audio.timeout_secs is 0; every audio job will time out".into());
        }

        if self.audio.sample_rate == 0 {
            warnings.push("audio.sample_rate is 0".into());
        }
        if self.audio.channels == 0 {
            warnings.push("audio.channels is 0".into());
        }
        if self.audio.mp3_bitrate.trim().is_empty() {
            warnings.push("audio.mp3_bitrate is empty".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Settings for multi-clip transition merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Crossfade length at every clip boundary.
    pub fade_duration_secs: f64,
    /// Video transition applied by the crossfade.
    pub transition: TransitionKind,
    /// Output video encoder; the engine picks one from the extension when unset.
    pub video_codec: Option<String>,
    /// Output audio encoder; the engine picks one from the extension when unset.
    pub audio_codec: Option<String>,
    /// Reject plans where the fade is not shorter than every clip.
    pub strict_fade: bool,
    /// Kill the engine if a merge runs longer than this.
    pub timeout_secs: Option<u64>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            fade_duration_secs: 1.0,
            transition: TransitionKind::default(),
            video_codec: None,
            audio_codec: None,
            strict_fade: false,
            timeout_secs: None,
        }
    }
}

/// Settings for single-clip audio operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of normalized speech audio, in Hz.
    pub sample_rate: u32,
    /// Channel count of normalized speech audio.
    pub channels: u8,
    /// Bitrate passed to the MP3 encoder (e.g. "128k").
    pub mp3_bitrate: String,
    pub timeout_secs: Option<u64>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            mp3_bitrate: "128k".into(),
            timeout_secs: None,
        }
    }
}

/// Video transition kinds understood by the engine's `xfade` filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    #[default]
    Fade,
    Dissolve,
    FadeBlack,
    WipeLeft,
    WipeRight,
    SlideLeft,
    SlideRight,
    CircleOpen,
}

impl TransitionKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [TransitionKind; 8] = [
        TransitionKind::Fade,
        TransitionKind::Dissolve,
        TransitionKind::FadeBlack,
        TransitionKind::WipeLeft,
        TransitionKind::WipeRight,
        TransitionKind::SlideLeft,
        TransitionKind::SlideRight,
        TransitionKind::CircleOpen,
    ];

    /// The `transition=` value for ffmpeg's `xfade` filter.
    pub fn xfade_name(&self) -> &'static str {
        match self {
            TransitionKind::Fade => "fade",
            TransitionKind::Dissolve => "dissolve",
            TransitionKind::FadeBlack => "fadeblack",
            TransitionKind::WipeLeft => "wipeleft",
            TransitionKind::WipeRight => "wiperight",
            TransitionKind::SlideLeft => "slideleft",
            TransitionKind::SlideRight => "slideright",
            TransitionKind::CircleOpen => "circleopen",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xfade_name())
    }
}

impl std::str::FromStr for TransitionKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.xfade_name() == lower)
            .ok_or_else(|| {
                crate::Error::Validation(format!("unknown transition kind '{s}'"))
            })
    }
}
