//! clipforge - crossfade merges and audio jobs over ffmpeg/ffprobe.
//!
//! The library surface is [`Clipforge`], which wires configuration, tool
//! discovery and the `cf-av` building blocks together, plus two free
//! functions for the common one-shot cases:
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> cf_core::Result<()> {
//! let clips = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4"), PathBuf::from("c.mp4")];
//! let merged = clipforge::merge_with_transitions(&clips, Path::new("merged.mp4"), 1.0).await?;
//! let meta = clipforge::probe_metadata(&merged).await?;
//! println!("{}s at {}x{}", meta.duration_secs, meta.width, meta.height);
//! # Ok(())
//! # }
//! ```

pub mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use cf_av::{
    ClipMetadata, Engine, EngineJob, FfmpegEngine, FfprobeProber, MediaProbe, MergeOptions,
    MergePipeline, MergePlan, MetadataProbe, ToolRegistry, TransitionGraphBuilder, TransitionPlan,
};
pub use cf_core::{Config, Error, Result, TransitionKind};

/// Configured entry point for every clipforge operation.
///
/// Holds the prober and engine behind their trait seams, so the same value
/// can drive real ffmpeg processes or test doubles.
#[derive(Clone)]
pub struct Clipforge {
    config: Config,
    prober: Arc<dyn MetadataProbe>,
    engine: Arc<dyn Engine>,
}

impl Clipforge {
    /// Resolve ffmpeg and ffprobe from `config.tools` (or `PATH`) and build
    /// a handle around them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`] if either tool cannot be found.
    pub fn from_config(config: Config) -> Result<Self> {
        let registry = ToolRegistry::discover(&config.tools);
        let ffprobe = registry.require("ffprobe")?.path.clone();
        let ffmpeg = registry.require("ffmpeg")?.path.clone();

        let prober = FfprobeProber::new(ffprobe)
            .with_timeout(config.merge.timeout_secs.map(Duration::from_secs));

        Ok(Self::with_backends(
            config,
            Arc::new(prober),
            Arc::new(FfmpegEngine::new(ffmpeg)),
        ))
    }

    /// Build a handle around explicit prober and engine implementations.
    pub fn with_backends(
        config: Config,
        prober: Arc<dyn MetadataProbe>,
        engine: Arc<dyn Engine>,
    ) -> Self {
        Self {
            config,
            prober,
            engine,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A merge pipeline using the configured merge settings.
    pub fn pipeline(&self) -> MergePipeline {
        self.pipeline_with(MergeOptions::from(&self.config.merge))
    }

    /// A merge pipeline with explicit options.
    pub fn pipeline_with(&self, options: MergeOptions) -> MergePipeline {
        MergePipeline::new(Arc::clone(&self.prober), Arc::clone(&self.engine), options)
    }

    /// Merge `clips` into `output`, crossfading every boundary.
    ///
    /// `fade_secs` overrides the configured fade duration.
    pub async fn merge(
        &self,
        clips: &[PathBuf],
        output: &Path,
        fade_secs: Option<f64>,
    ) -> Result<PathBuf> {
        let mut options = MergeOptions::from(&self.config.merge);
        if let Some(fade) = fade_secs {
            options = options.with_fade(fade);
        }
        self.pipeline_with(options).merge(clips, output).await
    }

    /// Probe the clips and plan a merge without running the engine.
    pub async fn plan(&self, clips: &[PathBuf]) -> Result<MergePlan> {
        self.pipeline().plan(clips).await
    }

    pub async fn probe_metadata(&self, path: &Path) -> Result<ClipMetadata> {
        self.prober.probe(path).await
    }

    pub async fn probe_media(&self, path: &Path) -> Result<MediaProbe> {
        self.prober.probe_media(path).await
    }

    pub async fn normalize_audio(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        cf_av::normalize_audio(self.engine.as_ref(), input, output, &self.config.audio).await
    }

    pub async fn encode_mp3(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        cf_av::encode_mp3(self.engine.as_ref(), input, output, &self.config.audio).await
    }

    pub async fn encode_mp3_bytes(&self, input: Vec<u8>) -> Result<Vec<u8>> {
        cf_av::encode_mp3_bytes(self.engine.as_ref(), input, &self.config.audio).await
    }

    pub async fn extract_audio_tracks(&self, input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        cf_av::extract_audio_tracks(
            self.engine.as_ref(),
            self.prober.as_ref(),
            input,
            output_dir,
            &self.config.audio,
        )
        .await
    }
}

/// Merge `paths`, in order, into `output` with a `fade_secs` crossfade at
/// every boundary, using tools found on `PATH` and default settings.
pub async fn merge_with_transitions(
    paths: &[PathBuf],
    output: &Path,
    fade_secs: f64,
) -> Result<PathBuf> {
    Clipforge::from_config(Config::default())?
        .merge(paths, output, Some(fade_secs))
        .await
}

/// Probe a single clip's duration and frame size with the ffprobe on `PATH`.
pub async fn probe_metadata(path: &Path) -> Result<ClipMetadata> {
    let prober = FfprobeProber::from_path()
        .ok_or_else(|| Error::tool("ffprobe", "ffprobe not found; is it installed and in PATH?"))?;
    prober.probe(path).await
}
