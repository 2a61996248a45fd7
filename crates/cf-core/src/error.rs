//! Unified error type for clipforge.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context (clip index, path, tool name, engine diagnostic) for a caller to
//! tell which input caused the failure. The CLI derives a process exit code
//! from it via [`Error::exit_code`].

use std::path::PathBuf;
use std::time::Duration;

/// Unified error type covering all failure modes in clipforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The media engine could not open or parse a clip.
    #[error("Probe error [{}]: {message}", probe_subject(*clip_index, path))]
    Probe {
        /// Position of the clip in the merge request, when probed as part of one.
        clip_index: Option<usize>,
        /// The clip that failed to probe.
        path: PathBuf,
        /// Engine diagnostic or parse failure description.
        message: String,
    },

    /// A merge was requested with fewer than two clips.
    #[error("Insufficient clips: a transition merge needs at least 2 clips, got {count}")]
    InsufficientClips {
        /// Number of clips supplied.
        count: usize,
    },

    /// The media engine failed while executing a merge filter graph.
    #[error("Merge error ({stages} transition stages): {message}")]
    Merge {
        /// Number of crossfade stages in the submitted graph.
        stages: usize,
        /// Underlying engine diagnostic.
        message: String,
    },

    /// An external tool invocation exceeded its configured time budget.
    #[error("Timeout [{tool}]: exceeded {after:?}")]
    Timeout {
        /// Name of the tool that was killed.
        tool: String,
        /// The budget that was exceeded.
        after: Duration,
    },

    /// An external tool (ffmpeg, ffprobe) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },
}

fn probe_subject(clip_index: Option<usize>, path: &std::path::Path) -> String {
    match clip_index {
        Some(index) => format!("clip {index}: {}", path.display()),
        None => path.display().to_string(),
    }
}

impl Error {
    /// Map this error to a process exit code for the CLI.
    ///
    /// Caller mistakes (bad arguments, unreadable inputs) map to 2, engine
    /// failures to 3, timeouts to 4 and everything else to 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InsufficientClips { .. } | Error::Validation(_) => 2,
            Error::Probe { .. } => 2,
            Error::Merge { .. } | Error::Tool { .. } => 3,
            Error::Timeout { .. } => 4,
            Error::Io { .. } | Error::Json { .. } => 1,
        }
    }

    /// Convenience constructor for a standalone [`Error::Probe`].
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Probe {
            clip_index: None,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attach a clip position to a probe failure.
    ///
    /// Errors other than [`Error::Probe`] are returned unchanged.
    pub fn at_clip(self, index: usize) -> Self {
        match self {
            Error::Probe { path, message, .. } => Error::Probe {
                clip_index: Some(index),
                path,
                message,
            },
            other => other,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Merge`].
    pub fn merge(stages: usize, message: impl Into<String>) -> Self {
        Error::Merge {
            stages,
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
