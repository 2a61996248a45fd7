//! Clip metadata probing.
//!
//! [`MetadataProbe`] is the seam between the merge pipeline and whatever
//! reads container metadata. [`FfprobeProber`] implements it by shelling
//! out to `ffprobe`; tests substitute in-memory stubs.

pub mod ffprobe;

pub use self::ffprobe::FfprobeProber;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Duration and frame size of a single clip.
///
/// A width and height of 0 mean the probe succeeded but found no stream
/// with dimensions (e.g. an audio-only file).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipMetadata {
    /// Container-level duration in seconds, 0 when the container omits it.
    pub duration_secs: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl ClipMetadata {
    /// Whether a dimensioned video stream was found.
    pub fn has_video(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// `(width, height)` when the clip has video.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.has_video().then_some((self.width, self.height))
    }
}

/// Broad stream category as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Other,
}

/// One stream inside a probed container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Absolute stream index within the container.
    pub index: u32,
    pub kind: StreamKind,
    pub codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
    pub language: Option<String>,
}

/// Full probe result for a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    pub path: PathBuf,
    /// Container format name (e.g. "mov,mp4,m4a,3gp,3g2,mj2").
    pub format_name: Option<String>,
    /// Container-level duration in seconds, 0 when absent.
    pub duration_secs: f64,
    pub streams: Vec<StreamInfo>,
}

impl MediaProbe {
    /// Reduce the probe to the metadata the merge pipeline needs.
    ///
    /// Dimensions come from the first stream that reports both a width and
    /// a height, regardless of its declared kind.
    pub fn clip_metadata(&self) -> ClipMetadata {
        let (width, height) = self
            .streams
            .iter()
            .find_map(|s| match (s.width, s.height) {
                (Some(w), Some(h)) => Some((w, h)),
                _ => None,
            })
            .unwrap_or((0, 0));

        ClipMetadata {
            duration_secs: self.duration_secs,
            width,
            height,
        }
    }

    /// Audio streams in container order.
    pub fn audio_streams(&self) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(|s| s.kind == StreamKind::Audio)
    }
}

/// A source of clip metadata.
///
/// Implementations must be safe to share across tasks (`Send + Sync`);
/// the merge pipeline probes every clip of a request concurrently.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe a clip and return its container and stream information.
    ///
    /// Fails with [`cf_core::Error::Probe`] when the clip cannot be opened
    /// or parsed.
    async fn probe_media(&self, path: &Path) -> cf_core::Result<MediaProbe>;

    /// Probe a clip and return only its duration and frame size.
    async fn probe(&self, path: &Path) -> cf_core::Result<ClipMetadata> {
        Ok(self.probe_media(path).await?.clip_metadata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(index: u32, kind: StreamKind, dims: Option<(u32, u32)>) -> StreamInfo {
        StreamInfo {
            index,
            kind,
            codec: None,
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            channels: None,
            sample_rate: None,
            language: None,
        }
    }

    #[test]
    fn metadata_uses_first_dimensioned_stream() {
        let probe = MediaProbe {
            path: PathBuf::from("clip.mp4"),
            format_name: None,
            duration_secs: 12.5,
            streams: vec![
                stream(0, StreamKind::Audio, None),
                stream(1, StreamKind::Video, Some((1280, 720))),
                stream(2, StreamKind::Video, Some((320, 240))),
            ],
        };
        let meta = probe.clip_metadata();
        assert_eq!(meta.duration_secs, 12.5);
        assert_eq!(meta.dimensions(), Some((1280, 720)));
    }

    #[test]
    fn audio_only_has_zero_dimensions() {
        let probe = MediaProbe {
            path: PathBuf::from("voice.wav"),
            format_name: Some("wav".into()),
            duration_secs: 3.0,
            streams: vec![stream(0, StreamKind::Audio, None)],
        };
        let meta = probe.clip_metadata();
        assert_eq!((meta.width, meta.height), (0, 0));
        assert!(!meta.has_video());
        assert_eq!(probe.audio_streams().count(), 1);
    }
}
