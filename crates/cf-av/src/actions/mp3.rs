//! MP3 encoding, to a file or entirely in memory.

use std::path::{Path, PathBuf};

use cf_core::AudioConfig;

use crate::engine::{Engine, EngineJob};
use crate::workspace::Workspace;

fn mp3_args(settings: &AudioConfig) -> cf_core::Result<[String; 5]> {
    let bitrate = settings.mp3_bitrate.trim();
    if bitrate.is_empty() {
        return Err(cf_core::Error::Validation("MP3 bitrate is empty".into()));
    }
    Ok([
        "-vn".into(),
        "-c:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        bitrate.to_string(),
    ])
}

/// Encode the audio of `input` into an MP3 file at `output`.
pub async fn encode_mp3(
    engine: &dyn Engine,
    input: &Path,
    output: &Path,
    settings: &AudioConfig,
) -> cf_core::Result<PathBuf> {
    let codec_args = mp3_args(settings)?;

    tracing::info!(
        input = %input.display(),
        bitrate = %settings.mp3_bitrate,
        "encoding mp3"
    );

    let workspace = Workspace::new(output)?;
    let job = EngineJob::new()
        .input(input)
        .args(codec_args)
        .args(["-f", "mp3"])
        .arg(workspace.output().to_string_lossy())
        .timeout(super::audio_timeout(settings));

    engine.run(&job).await?;
    workspace.finalize()
}

/// Encode an in-memory audio buffer to MP3 and return the encoded bytes.
///
/// The buffer is streamed to the engine's stdin and the MP3 is read back
/// from its stdout; nothing touches the filesystem. The input container is
/// detected by the engine, so any format it can demux from a pipe works.
pub async fn encode_mp3_bytes(
    engine: &dyn Engine,
    input: Vec<u8>,
    settings: &AudioConfig,
) -> cf_core::Result<Vec<u8>> {
    if input.is_empty() {
        return Err(cf_core::Error::Validation("input audio buffer is empty".into()));
    }
    let codec_args = mp3_args(settings)?;

    tracing::debug!(bytes = input.len(), "encoding mp3 in memory");

    let job = EngineJob::new()
        .args(["-i", "pipe:0"])
        .args(codec_args)
        .args(["-f", "mp3", "pipe:1"])
        .stdin(input)
        .timeout(super::audio_timeout(settings));

    let output = engine.run(&job).await?;
    if output.stdout.is_empty() {
        return Err(cf_core::Error::tool(
            engine.name(),
            "encoder produced no MP3 data",
        ));
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingEngine;

    #[tokio::test]
    async fn file_job_uses_lame_with_configured_bitrate() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("episode.mp3");
        let engine = RecordingEngine::default();
        let settings = AudioConfig {
            mp3_bitrate: "192k".into(),
            ..AudioConfig::default()
        };

        encode_mp3(&engine, Path::new("episode.wav"), &output, &settings)
            .await
            .unwrap();
        assert!(output.exists());

        let jobs = engine.jobs();
        let args = &jobs[0].args;
        let joined = args.join(" ");
        assert!(joined.contains("-i episode.wav -vn -c:a libmp3lame -b:a 192k -f mp3"), "{joined}");
    }

    #[tokio::test]
    async fn in_memory_job_pipes_both_ends() {
        let engine = RecordingEngine::with_stdout(b"ID3mp3frames");
        let mp3 = encode_mp3_bytes(&engine, b"RIFF....WAVE".to_vec(), &AudioConfig::default())
            .await
            .unwrap();
        assert_eq!(mp3, b"ID3mp3frames");

        let jobs = engine.jobs();
        let job = &jobs[0];
        assert_eq!(job.stdin.as_deref(), Some(&b"RIFF....WAVE"[..]));
        assert!(job.args.windows(2).any(|w| w == ["-i", "pipe:0"]));
        assert_eq!(job.args.last().map(String::as_str), Some("pipe:1"));
    }

    #[tokio::test]
    async fn empty_buffer_is_rejected() {
        let engine = RecordingEngine::default();
        let err = encode_mp3_bytes(&engine, Vec::new(), &AudioConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, cf_core::Error::Validation(_)));
        assert!(engine.jobs().is_empty());
    }

    #[tokio::test]
    async fn empty_engine_output_is_an_error() {
        let engine = RecordingEngine::default();
        let err = encode_mp3_bytes(&engine, vec![1, 2, 3], &AudioConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, cf_core::Error::Tool { .. }));
    }
}
