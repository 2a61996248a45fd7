//! Single-clip engine jobs: speech normalization, MP3 encoding and audio
//! track extraction.
//!
//! Each action is one engine invocation. File outputs are staged through a
//! [`crate::Workspace`] and only moved into place on success.

mod extract;
mod mp3;
mod normalize;

pub use extract::{extract_audio_tracks, track_file_name};
pub use mp3::{encode_mp3, encode_mp3_bytes};
pub use normalize::normalize_audio;

use std::time::Duration;

/// Timeout configured for audio jobs.
fn audio_timeout(settings: &cf_core::AudioConfig) -> Option<Duration> {
    settings.timeout_secs.map(Duration::from_secs)
}
