//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a [`Clipforge`] to in-memory
//! [`StubProber`] and [`StubEngine`] doubles so merges can be exercised
//! without ffmpeg installed.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use cf_av::{MediaProbe, StreamInfo, StreamKind, ToolOutput};
use clipforge::{Clipforge, Config, Engine, EngineJob, MetadataProbe};

/// Canned probe outcome for one path.
#[derive(Clone)]
enum Canned {
    Clip { duration: f64, width: u32, height: u32 },
    Fail(String),
}

/// Prober serving canned results, each after an optional delay.
#[derive(Default)]
pub struct StubProber {
    canned: HashMap<PathBuf, (Canned, Duration)>,
    completed: AtomicUsize,
}

impl StubProber {
    pub fn clip(mut self, path: &str, duration: f64, width: u32, height: u32) -> Self {
        self.canned.insert(
            PathBuf::from(path),
            (Canned::Clip { duration, width, height }, Duration::ZERO),
        );
        self
    }

    pub fn failing(mut self, path: &str, message: &str, delay: Duration) -> Self {
        self.canned
            .insert(PathBuf::from(path), (Canned::Fail(message.to_string()), delay));
        self
    }

    /// Probes that ran to completion, successful or not.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProbe for StubProber {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn probe_media(&self, path: &Path) -> clipforge::Result<MediaProbe> {
        let (canned, delay) = self
            .canned
            .get(path)
            .cloned()
            .unwrap_or_else(|| (Canned::Fail("No such file or directory".into()), Duration::ZERO));
        tokio::time::sleep(delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);

        match canned {
            Canned::Fail(message) => Err(clipforge::Error::probe(path, message)),
            Canned::Clip { duration, width, height } => {
                let mut streams = Vec::new();
                if width > 0 {
                    streams.push(StreamInfo {
                        index: 0,
                        kind: StreamKind::Video,
                        codec: Some("h264".into()),
                        width: Some(width),
                        height: Some(height),
                        channels: None,
                        sample_rate: None,
                        language: None,
                    });
                }
                streams.push(StreamInfo {
                    index: streams.len() as u32,
                    kind: StreamKind::Audio,
                    codec: Some("aac".into()),
                    width: None,
                    height: None,
                    channels: Some(2),
                    sample_rate: Some(48000),
                    language: None,
                });
                Ok(MediaProbe {
                    path: path.to_path_buf(),
                    format_name: Some("mov,mp4,m4a,3gp,3g2,mj2".into()),
                    duration_secs: duration,
                    streams,
                })
            }
        }
    }
}

/// Engine that records jobs and writes a placeholder to the output path
/// (the last argument), or fails with a fixed diagnostic.
#[derive(Default)]
pub struct StubEngine {
    jobs: Mutex<Vec<EngineJob>>,
    failure: Option<String>,
}

impl StubEngine {
    pub fn failing(diagnostic: &str) -> Self {
        Self {
            failure: Some(diagnostic.to_string()),
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> Vec<EngineJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn run(&self, job: &EngineJob) -> clipforge::Result<ToolOutput> {
        self.jobs.lock().unwrap().push(job.clone());
        if let Some(diagnostic) = &self.failure {
            return Err(clipforge::Error::tool("ffmpeg", diagnostic.clone()));
        }
        if let Some(output) = job.args.last() {
            std::fs::write(output, b"merged")?;
        }
        Ok(ToolOutput::default())
    }
}

/// A [`Clipforge`] over stubs, with handles kept for assertions.
pub struct TestHarness {
    pub forge: Clipforge,
    pub prober: Arc<StubProber>,
    pub engine: Arc<StubEngine>,
}

impl TestHarness {
    pub fn new(prober: StubProber, engine: StubEngine) -> Self {
        Self::with_config(Config::default(), prober, engine)
    }

    pub fn with_config(config: Config, prober: StubProber, engine: StubEngine) -> Self {
        let prober = Arc::new(prober);
        let engine = Arc::new(engine);
        let forge = Clipforge::with_backends(
            config,
            Arc::clone(&prober) as Arc<dyn MetadataProbe>,
            Arc::clone(&engine) as Arc<dyn Engine>,
        );
        Self {
            forge,
            prober,
            engine,
        }
    }
}

pub fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}
