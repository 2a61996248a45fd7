//! Multi-clip transition merges.
//!
//! [`MergePipeline::merge`] probes every clip concurrently, plans the
//! crossfade chain with [`TransitionGraphBuilder`], and submits the whole
//! chain as a single engine job. Clips are never merged pairwise: one
//! engine process decodes every input once and encodes the result once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cf_core::{MergeConfig, TransitionKind};
use futures::future::join_all;

use crate::engine::{Engine, EngineJob};
use crate::probe::{ClipMetadata, MetadataProbe};
use crate::transition::{TransitionGraphBuilder, TransitionPlan, MIN_CLIPS};
use crate::workspace::Workspace;

/// Per-call merge settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    pub fade_secs: f64,
    pub transition: TransitionKind,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    /// Turn fade-overrun warnings into a validation error.
    pub strict_fade: bool,
    pub timeout: Option<Duration>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::from(&MergeConfig::default())
    }
}

impl From<&MergeConfig> for MergeOptions {
    fn from(cfg: &MergeConfig) -> Self {
        Self {
            fade_secs: cfg.fade_duration_secs,
            transition: cfg.transition,
            video_codec: cfg.video_codec.clone(),
            audio_codec: cfg.audio_codec.clone(),
            strict_fade: cfg.strict_fade,
            timeout: cfg.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl MergeOptions {
    pub fn with_fade(mut self, fade_secs: f64) -> Self {
        self.fade_secs = fade_secs;
        self
    }
}

/// A planned merge: probed metadata index-aligned with the clips, and the
/// crossfade chain derived from it.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub clips: Vec<PathBuf>,
    pub metadata: Vec<ClipMetadata>,
    pub transitions: TransitionPlan,
}

impl MergePlan {
    /// The engine job that executes this plan, writing to `output`.
    pub fn engine_job(&self, output: &Path, options: &MergeOptions) -> EngineJob {
        let job = self
            .clips
            .iter()
            .fold(EngineJob::new(), |job, clip| job.input(clip))
            .arg("-filter_complex")
            .arg(self.transitions.filter_complex())
            .args(self.transitions.map_args());

        let job = match &options.video_codec {
            Some(codec) => job.args(["-c:v", codec.as_str()]),
            None => job,
        };
        let job = match &options.audio_codec {
            Some(codec) => job.args(["-c:a", codec.as_str()]),
            None => job,
        };

        job.arg(output.to_string_lossy()).timeout(options.timeout)
    }
}

/// Orchestrates probing, planning and the single engine invocation of a
/// transition merge.
///
/// The pipeline holds no per-request state; concurrent merges are
/// independent as long as they target different output paths.
#[derive(Clone)]
pub struct MergePipeline {
    prober: Arc<dyn MetadataProbe>,
    engine: Arc<dyn Engine>,
    options: MergeOptions,
}

impl MergePipeline {
    pub fn new(
        prober: Arc<dyn MetadataProbe>,
        engine: Arc<dyn Engine>,
        options: MergeOptions,
    ) -> Self {
        Self {
            prober,
            engine,
            options,
        }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Probe every clip concurrently, returning metadata in clip order.
    ///
    /// All probes run to completion; if any failed, the failure of the
    /// lowest-indexed clip is returned, tagged with that index, and every
    /// other result is discarded.
    pub async fn probe_all(&self, clips: &[PathBuf]) -> cf_core::Result<Vec<ClipMetadata>> {
        let probes = clips.iter().enumerate().map(|(index, clip)| {
            let prober = Arc::clone(&self.prober);
            async move {
                prober
                    .probe(clip)
                    .await
                    .map_err(|e| e.at_clip(index))
            }
        });

        join_all(probes).await.into_iter().collect()
    }

    /// Probe the clips and plan the merge without running the engine.
    pub async fn plan(&self, clips: &[PathBuf]) -> cf_core::Result<MergePlan> {
        if clips.len() < MIN_CLIPS {
            return Err(cf_core::Error::InsufficientClips { count: clips.len() });
        }

        let metadata = self.probe_all(clips).await?;
        warn_on_mismatched_dimensions(clips, &metadata);

        let durations: Vec<f64> = metadata.iter().map(|m| m.duration_secs).collect();
        let transitions = TransitionGraphBuilder::new(self.options.fade_secs)
            .transition(self.options.transition)
            .build(&durations)?;

        if self.options.strict_fade && !transitions.warnings.is_empty() {
            let reasons: Vec<String> = transitions.warnings.iter().map(|w| w.to_string()).collect();
            return Err(cf_core::Error::Validation(reasons.join("; ")));
        }

        Ok(MergePlan {
            clips: clips.to_vec(),
            metadata,
            transitions,
        })
    }

    /// Merge `clips`, in order, into `output` with a crossfade at every
    /// boundary. Resolves to `output` once the engine has finished.
    ///
    /// # Errors
    ///
    /// - [`cf_core::Error::InsufficientClips`] for fewer than two clips.
    /// - [`cf_core::Error::Probe`] (with the clip index) if any clip cannot
    ///   be probed; the engine is not invoked.
    /// - [`cf_core::Error::Merge`] with the engine diagnostic if the engine
    ///   fails. Nothing is written to `output` in that case.
    /// - [`cf_core::Error::Timeout`] if the configured timeout elapses.
    pub async fn merge(&self, clips: &[PathBuf], output: &Path) -> cf_core::Result<PathBuf> {
        if clips.iter().any(|c| c == output) {
            return Err(cf_core::Error::Validation(format!(
                "output {} is also one of the input clips",
                output.display()
            )));
        }

        let plan = self.plan(clips).await?;
        let stages = plan.transitions.stages.len();

        tracing::info!(
            clips = clips.len(),
            stages,
            fade = self.options.fade_secs,
            transition = %self.options.transition,
            expected_duration = plan.transitions.total_duration_secs,
            output = %output.display(),
            "merging clips"
        );

        let workspace = Workspace::new(output)?;
        let job = plan.engine_job(&workspace.output(), &self.options);

        self.engine.run(&job).await.map_err(|e| match e {
            cf_core::Error::Tool { message, .. } => cf_core::Error::merge(stages, message),
            other => other,
        })?;

        let merged = workspace.finalize()?;
        tracing::info!(output = %merged.display(), "merge complete");
        Ok(merged)
    }
}

fn warn_on_mismatched_dimensions(clips: &[PathBuf], metadata: &[ClipMetadata]) {
    let mut sized = clips
        .iter()
        .zip(metadata)
        .filter_map(|(clip, m)| m.dimensions().map(|d| (clip, d)));

    let Some((first_clip, first)) = sized.next() else {
        tracing::warn!("no clip has a video stream; the video crossfade will fail");
        return;
    };

    for (clip, dims) in sized {
        if dims != first {
            tracing::warn!(
                clip = %clip.display(),
                width = dims.0,
                height = dims.1,
                expected_width = first.0,
                expected_height = first.1,
                reference = %first_clip.display(),
                "clip dimensions differ; xfade needs matching frame sizes"
            );
        }
    }
}
