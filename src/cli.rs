use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cf_core::TransitionKind;

#[derive(Parser)]
#[command(name = "clipforge")]
#[command(author, version, about = "Crossfade clip merging and audio jobs over ffmpeg")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge clips in order with a crossfade at every boundary
    Merge {
        /// Clips to merge, in playback order
        #[arg(required = true)]
        clips: Vec<PathBuf>,

        /// Output file; the extension picks the container
        #[arg(short, long)]
        output: PathBuf,

        /// Crossfade duration in seconds (overrides the config)
        #[arg(short, long)]
        fade: Option<f64>,

        /// Video transition (fade, dissolve, fadeblack, wipeleft, ...)
        #[arg(short, long)]
        transition: Option<TransitionKind>,

        /// Fail instead of warning when the fade is not shorter than a clip
        #[arg(long)]
        strict: bool,
    },

    /// Print the crossfade filter graph without running ffmpeg
    Plan {
        /// Clips to probe and plan
        clips: Vec<PathBuf>,

        /// Plan from known durations instead of probing clips
        #[arg(long, value_delimiter = ',', conflicts_with = "clips")]
        durations: Option<Vec<f64>>,

        /// Crossfade duration in seconds (overrides the config)
        #[arg(short, long)]
        fade: Option<f64>,

        /// Video transition (overrides the config)
        #[arg(short, long)]
        transition: Option<TransitionKind>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert audio to mono 16 kHz 16-bit WAV for speech recognition
    Normalize {
        /// Input audio or video file
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encode audio to MP3
    Mp3 {
        /// Input file, or "-" to read from stdin
        input: PathBuf,

        /// Output file, or "-" to write to stdout (defaults to the input with .mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bitrate (overrides the config), e.g. 192k
        #[arg(short, long)]
        bitrate: Option<String>,
    },

    /// Copy every audio track into its own .mka file
    ExtractAudio {
        /// Input media file
        input: PathBuf,

        /// Directory for the extracted tracks (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
