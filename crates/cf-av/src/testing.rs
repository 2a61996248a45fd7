//! In-memory engine and prober stubs shared by the unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::command::ToolOutput;
use crate::engine::{Engine, EngineJob};
use crate::probe::{MediaProbe, MetadataProbe};

/// Records every job. Succeeds by touching each staged output named in the
/// arguments and echoing `stdout`, or fails with a fixed diagnostic.
#[derive(Default)]
pub struct RecordingEngine {
    jobs: Mutex<Vec<EngineJob>>,
    failure: Option<String>,
    stdout: Vec<u8>,
}

impl RecordingEngine {
    pub fn failing(diagnostic: &str) -> Self {
        Self {
            failure: Some(diagnostic.to_string()),
            ..Self::default()
        }
    }

    pub fn with_stdout(stdout: &[u8]) -> Self {
        Self {
            stdout: stdout.to_vec(),
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> Vec<EngineJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for RecordingEngine {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn run(&self, job: &EngineJob) -> cf_core::Result<ToolOutput> {
        self.jobs.lock().unwrap().push(job.clone());

        if let Some(diagnostic) = &self.failure {
            return Err(cf_core::Error::tool("ffmpeg", diagnostic.clone()));
        }

        for arg in &job.args {
            let path = Path::new(arg);
            let staged = path
                .parent()
                .and_then(|p| p.file_name())
                .is_some_and(|n| n.to_string_lossy().starts_with(".clipforge-"));
            if staged {
                std::fs::write(path, b"engine output")?;
            }
        }

        Ok(ToolOutput {
            stdout: self.stdout.clone(),
            stderr: String::new(),
        })
    }
}

/// Serves canned probe results keyed by path; unknown paths fail.
#[derive(Default)]
pub struct StubProber {
    probes: HashMap<PathBuf, MediaProbe>,
}

impl StubProber {
    pub fn with(mut self, probe: MediaProbe) -> Self {
        self.probes.insert(probe.path.clone(), probe);
        self
    }
}

#[async_trait]
impl MetadataProbe for StubProber {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn probe_media(&self, path: &Path) -> cf_core::Result<MediaProbe> {
        self.probes
            .get(path)
            .cloned()
            .ok_or_else(|| cf_core::Error::probe(path, "No such file or directory"))
    }
}
