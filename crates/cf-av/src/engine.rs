//! The media engine seam.
//!
//! Every transcoding job in this crate is one [`EngineJob`] submitted to an
//! [`Engine`]. [`FfmpegEngine`] runs the job as a single `ffmpeg` process;
//! tests substitute recording stubs.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::command::{ToolCommand, ToolOutput};

/// Arguments shared by every job: overwrite without prompting, keep stderr
/// down to actual errors so failures carry a readable diagnostic.
const COMMON_ARGS: [&str; 4] = ["-y", "-hide_banner", "-loglevel", "error"];

/// One engine invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineJob {
    /// Engine arguments, excluding the program name.
    pub args: Vec<String>,
    /// Bytes to feed the engine on stdin (for `pipe:0` inputs).
    pub stdin: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl EngineJob {
    /// Start a job with the common leading arguments.
    pub fn new() -> Self {
        Self {
            args: COMMON_ARGS.iter().map(|s| s.to_string()).collect(),
            stdin: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `-i <path>`.
    pub fn input(self, path: &std::path::Path) -> Self {
        self.arg("-i").arg(path.to_string_lossy())
    }

    pub fn stdin(mut self, data: Vec<u8>) -> Self {
        self.stdin = Some(data);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Something that can execute [`EngineJob`]s.
///
/// One call is one engine process: the returned future resolves exactly once,
/// when the engine has finished or failed.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Human-readable engine name, used in logs.
    fn name(&self) -> &'static str;

    /// Run the job to completion.
    ///
    /// A non-zero exit surfaces as [`cf_core::Error::Tool`] carrying the
    /// engine's stderr; an exceeded timeout as [`cf_core::Error::Timeout`].
    async fn run(&self, job: &EngineJob) -> cf_core::Result<ToolOutput>;
}

/// An [`Engine`] backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg_path: PathBuf,
}

impl FfmpegEngine {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Create an engine that finds ffmpeg on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn run(&self, job: &EngineJob) -> cf_core::Result<ToolOutput> {
        let mut cmd = ToolCommand::new(self.ffmpeg_path.clone());
        cmd.args(job.args.iter().cloned());
        cmd.timeout(job.timeout);
        if let Some(data) = &job.stdin {
            cmd.stdin(data.clone());
        }
        cmd.execute().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn job_starts_with_common_args() {
        let job = EngineJob::new().input(Path::new("in.wav")).arg("out.mp3");
        assert_eq!(
            job.args,
            vec!["-y", "-hide_banner", "-loglevel", "error", "-i", "in.wav", "out.mp3"]
        );
        assert!(job.stdin.is_none());
        assert!(job.timeout.is_none());
    }

    #[tokio::test]
    async fn missing_ffmpeg_is_a_tool_error() {
        let engine = FfmpegEngine::new(PathBuf::from("nonexistent_ffmpeg_xyz"));
        let err = engine.run(&EngineJob::new()).await.unwrap_err();
        assert!(matches!(err, cf_core::Error::Tool { .. }));
    }
}
