//! FFprobe-based [`MetadataProbe`] implementation.
//!
//! Shells out to `ffprobe -v error -print_format json -show_format -show_streams`
//! and maps the JSON output into [`MediaProbe`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{MediaProbe, MetadataProbe, StreamInfo, StreamKind};
use crate::command::ToolCommand;

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    /// Path to the ffprobe binary.
    ffprobe_path: PathBuf,
    timeout: Option<Duration>,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self {
            ffprobe_path,
            timeout: None,
        }
    }

    /// Create a prober that finds ffprobe on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("ffprobe").ok().map(Self::new)
    }

    /// Kill ffprobe if a single probe takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MetadataProbe for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe_media(&self, path: &Path) -> cf_core::Result<MediaProbe> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.args([
            "-v", "error",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ]);
        cmd.arg(path.to_string_lossy().as_ref());
        cmd.timeout(self.timeout);

        let output = cmd.execute().await.map_err(|e| match e {
            cf_core::Error::Tool { message, .. } => cf_core::Error::probe(path, message),
            other => other,
        })?;

        let probe = parse_ffprobe_json(path, &output.stdout_text())?;
        tracing::debug!(
            path = %path.display(),
            duration = probe.duration_secs,
            streams = probe.streams.len(),
            "probed clip"
        );
        Ok(probe)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse ffprobe's JSON document for the clip at `path`.
pub fn parse_ffprobe_json(path: &Path, json: &str) -> cf_core::Result<MediaProbe> {
    let output: FfprobeOutput = serde_json::from_str(json).map_err(|e| {
        cf_core::Error::probe(path, format!("ffprobe JSON parse error: {e}"))
    })?;

    let streams = output
        .streams
        .into_iter()
        .map(|s| StreamInfo {
            index: s.index,
            kind: map_stream_kind(s.codec_type.as_deref().unwrap_or("")),
            codec: s.codec_name,
            // ffprobe reports 0x0 for some undecodable streams; treat as absent.
            width: s.width.filter(|&w| w > 0),
            height: s.height.filter(|&h| h > 0),
            channels: s.channels,
            sample_rate: s.sample_rate.and_then(|r| r.parse().ok()),
            language: s.tags.language,
        })
        .collect();

    Ok(MediaProbe {
        path: path.to_path_buf(),
        format_name: output.format.format_name,
        duration_secs: parse_duration(output.format.duration.as_deref()),
        streams,
    })
}

/// Container duration in seconds; missing, `N/A`, negative or non-finite
/// values all become 0.
fn parse_duration(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0)
}

fn map_stream_kind(codec_type: &str) -> StreamKind {
    match codec_type {
        "video" => StreamKind::Video,
        "audio" => StreamKind::Audio,
        "subtitle" => StreamKind::Subtitle,
        "data" => StreamKind::Data,
        _ => StreamKind::Other,
    }
}
