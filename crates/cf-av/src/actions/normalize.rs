//! Speech-recognition audio normalization.

use std::path::{Path, PathBuf};

use cf_core::AudioConfig;

use crate::engine::{Engine, EngineJob};
use crate::workspace::Workspace;

/// Convert any audio or video input into the mono, 16-bit PCM WAV at a fixed
/// sample rate that speech recognizers expect. Video streams are dropped.
///
/// Channel count and sample rate come from `settings` (mono / 16 kHz by
/// default).
pub async fn normalize_audio(
    engine: &dyn Engine,
    input: &Path,
    output: &Path,
    settings: &AudioConfig,
) -> cf_core::Result<PathBuf> {
    if settings.sample_rate == 0 || settings.channels == 0 {
        return Err(cf_core::Error::Validation(format!(
            "normalization needs a positive sample rate and channel count, got {} Hz / {} ch",
            settings.sample_rate, settings.channels
        )));
    }

    tracing::info!(
        input = %input.display(),
        sample_rate = settings.sample_rate,
        channels = settings.channels,
        "normalizing audio"
    );

    let workspace = Workspace::new(output)?;
    let job = EngineJob::new()
        .input(input)
        .args(["-vn", "-ac"])
        .arg(settings.channels.to_string())
        .arg("-ar")
        .arg(settings.sample_rate.to_string())
        .args(["-c:a", "pcm_s16le", "-f", "wav"])
        .arg(workspace.output().to_string_lossy())
        .timeout(super::audio_timeout(settings));

    engine.run(&job).await?;
    workspace.finalize()
}
