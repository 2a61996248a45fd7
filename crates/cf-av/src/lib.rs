//! # cf-av
//!
//! ffmpeg/ffprobe orchestration for clipforge.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ffprobe.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   and stdin support for running external processes.
//! - **Probing** ([`MetadataProbe`], [`FfprobeProber`]) -- clip duration,
//!   frame size and stream layout.
//! - **Transition planning** ([`TransitionGraphBuilder`]) -- pure
//!   construction of the chained crossfade filter graph.
//! - **Merging** ([`MergePipeline`]) -- probe, plan and a single engine run.
//! - **Single-clip actions** ([`actions`]) -- speech normalization, MP3
//!   encoding and audio track extraction.
//! - **Workspace management** ([`Workspace`]) -- staged outputs that only
//!   land on their destination when the engine succeeds.

pub mod actions;
pub mod command;
pub mod engine;
pub mod merge;
pub mod probe;
pub mod tools;
pub mod transition;
pub mod workspace;

#[cfg(test)]
mod testing;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use engine::{Engine, EngineJob, FfmpegEngine};
pub use merge::{MergeOptions, MergePipeline, MergePlan};
pub use probe::{ClipMetadata, FfprobeProber, MediaProbe, MetadataProbe, StreamInfo, StreamKind};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transition::{
    build_plan, GraphStage, MediaKind, PlanWarning, StreamLabel, TransitionGraphBuilder,
    TransitionPlan, MIN_CLIPS,
};
pub use workspace::Workspace;

// Action functions
pub use actions::{
    encode_mp3, encode_mp3_bytes, extract_audio_tracks, normalize_audio, track_file_name,
};
