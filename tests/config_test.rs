//! Integration tests for configuration loading.

use std::fs;

use clipforge::config::{load_config, load_config_or_default, TransitionKind};

#[test]
fn full_config_file_round_trips_into_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clipforge.toml");
    fs::write(
        &path,
        r#"
[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"

[merge]
fade_duration_secs = 0.75
transition = "slideleft"
video_codec = "libx264"
audio_codec = "aac"
strict_fade = true
timeout_secs = 600

[audio]
sample_rate = 22050
channels = 2
mp3_bitrate = "192k"
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(
        config.tools.ffmpeg_path.as_deref(),
        Some(std::path::Path::new("/opt/ffmpeg/bin/ffmpeg"))
    );
    assert!(config.tools.ffprobe_path.is_none());
    assert_eq!(config.merge.fade_duration_secs, 0.75);
    assert_eq!(config.merge.transition, TransitionKind::SlideLeft);
    assert_eq!(config.merge.video_codec.as_deref(), Some("libx264"));
    assert!(config.merge.strict_fade);
    assert_eq!(config.merge.timeout_secs, Some(600));
    assert_eq!(config.audio.sample_rate, 22050);
    assert_eq!(config.audio.channels, 2);
    assert_eq!(config.audio.mp3_bitrate, "192k");
    assert!(config.audio.timeout_secs.is_none());
}

#[test]
fn empty_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.merge.fade_duration_secs, 1.0);
    assert_eq!(config.audio.sample_rate, 16_000);
}

#[test]
fn malformed_file_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[merge\nfade_duration_secs = ").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"), "{err:#}");
}

#[test]
fn unknown_transition_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spin.toml");
    fs::write(&path, "[merge]\ntransition = \"spin\"\n").unwrap();

    assert!(load_config(&path).is_err());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_or_default(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
