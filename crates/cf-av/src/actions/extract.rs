//! Audio track extraction.

use std::path::{Path, PathBuf};

use cf_core::AudioConfig;

use crate::engine::{Engine, EngineJob};
use crate::probe::MetadataProbe;
use crate::workspace::Workspace;

/// File name for the `track`-th audio track of `input`:
/// `<stem>.track<N>.mka`.
pub fn track_file_name(input: &Path, track: usize) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    format!("{stem}.track{track}.mka")
}

/// Copy every audio track of `input` into its own Matroska audio file in
/// `output_dir`, without re-encoding.
///
/// All tracks are demuxed by a single engine invocation. Returns the
/// written paths in track order.
///
/// # Errors
///
/// Returns [`cf_core::Error::Validation`] if `output_dir` is not a
/// directory or the input has no audio streams; probe and engine failures
/// are propagated.
pub async fn extract_audio_tracks(
    engine: &dyn Engine,
    prober: &dyn MetadataProbe,
    input: &Path,
    output_dir: &Path,
    settings: &AudioConfig,
) -> cf_core::Result<Vec<PathBuf>> {
    if !output_dir.is_dir() {
        return Err(cf_core::Error::Validation(format!(
            "output directory {} does not exist",
            output_dir.display()
        )));
    }

    let probe = prober.probe_media(input).await?;
    let tracks = probe.audio_streams().count();
    if tracks == 0 {
        return Err(cf_core::Error::Validation(format!(
            "{} has no audio streams",
            input.display()
        )));
    }

    tracing::info!(input = %input.display(), tracks, "extracting audio tracks");

    let workspace = Workspace::new(&output_dir.join(track_file_name(input, 0)))?;
    let names: Vec<String> = (0..tracks).map(|i| track_file_name(input, i)).collect();

    let job = names.iter().enumerate().fold(
        EngineJob::new().input(input),
        |job, (i, name)| {
            job.arg("-map")
                .arg(format!("0:a:{i}"))
                .args(["-c", "copy"])
                .arg(workspace.temp_file(name).to_string_lossy())
        },
    );
    engine.run(&job.timeout(super::audio_timeout(settings))).await?;

    names
        .iter()
        .map(|name| workspace.persist(&workspace.temp_file(name), &output_dir.join(name)))
        .collect()
}
