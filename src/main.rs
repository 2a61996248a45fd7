mod cli;

use clipforge::{config, Clipforge, TransitionGraphBuilder, TransitionPlan};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipforge=trace,cf_av=trace,cf_core=debug".to_string()
        } else {
            "clipforge=info,cf_av=info,cf_core=info".to_string()
        }
    });

    // Logs go to stderr; stdout carries command output (including piped MP3).
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit code for a failed command: library errors carry their own, anything
/// else is a generic failure.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<clipforge::Error>()
        .map(clipforge::Error::exit_code)
        .unwrap_or(1)
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Merge {
            clips,
            output,
            fade,
            transition,
            strict,
        } => {
            let mut config = config::load_config_or_default(config_path)?;
            if let Some(kind) = transition {
                config.merge.transition = kind;
            }
            config.merge.strict_fade |= strict;
            block_on(merge(config, &clips, &output, fade))
        }
        Commands::Plan {
            clips,
            durations,
            fade,
            transition,
            json,
        } => {
            let mut config = config::load_config_or_default(config_path)?;
            if let Some(fade) = fade {
                config.merge.fade_duration_secs = fade;
            }
            if let Some(kind) = transition {
                config.merge.transition = kind;
            }
            block_on(plan(config, &clips, durations, json))
        }
        Commands::Probe { file, json } => {
            let config = config::load_config_or_default(config_path)?;
            block_on(probe_file(config, &file, json))
        }
        Commands::Normalize { input, output } => {
            let config = config::load_config_or_default(config_path)?;
            block_on(normalize(config, &input, &output))
        }
        Commands::Mp3 {
            input,
            output,
            bitrate,
        } => {
            let mut config = config::load_config_or_default(config_path)?;
            if let Some(bitrate) = bitrate {
                config.audio.mp3_bitrate = bitrate;
            }
            block_on(encode_mp3(config, &input, output))
        }
        Commands::ExtractAudio { input, output_dir } => {
            let config = config::load_config_or_default(config_path)?;
            let output_dir = output_dir.unwrap_or_else(|| match input.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            });
            block_on(extract_audio(config, &input, &output_dir))
        }
        Commands::CheckTools => {
            let config = config::load_config_or_default(config_path)?;
            check_tools(&config)
        }
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("clipforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}

async fn merge(
    config: config::Config,
    clips: &[PathBuf],
    output: &Path,
    fade: Option<f64>,
) -> Result<()> {
    let merged = Clipforge::from_config(config)?
        .merge(clips, output, fade)
        .await?;
    println!("{}", merged.display());
    Ok(())
}

async fn plan(
    config: config::Config,
    clips: &[PathBuf],
    durations: Option<Vec<f64>>,
    json: bool,
) -> Result<()> {
    let transitions = match durations {
        Some(durations) => TransitionGraphBuilder::new(config.merge.fade_duration_secs)
            .transition(config.merge.transition)
            .build(&durations)?,
        None => Clipforge::from_config(config)?.plan(clips).await?.transitions,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan_json(&transitions))?);
        return Ok(());
    }

    for warning in &transitions.warnings {
        println!("warning: {warning}");
    }
    for stage in &transitions.stages {
        println!(
            "stage {}: clip {} enters at {:.3}s ({} -> {})",
            stage.index, stage.incoming, stage.offset_secs, stage.video_in, stage.video_out
        );
    }
    println!("expected duration: {:.3}s", transitions.total_duration_secs);
    println!("-filter_complex {}", transitions.filter_complex());
    println!("{}", transitions.map_args().join(" "));
    Ok(())
}

fn plan_json(plan: &TransitionPlan) -> serde_json::Value {
    let (video, audio) = plan.output_labels();
    serde_json::json!({
        "inputs": plan.input_count(),
        "transition": plan.transition.to_string(),
        "fade_secs": plan.fade_secs,
        "offsets": plan.stages.iter().map(|s| s.offset_secs).collect::<Vec<_>>(),
        "total_duration_secs": plan.total_duration_secs,
        "filter_complex": plan.filter_complex(),
        "output_video": video.to_string(),
        "output_audio": audio.to_string(),
        "warnings": plan.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    })
}

async fn probe_file(config: config::Config, file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let probe = Clipforge::from_config(config)?.probe_media(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&probe)?);
        return Ok(());
    }

    let meta = probe.clip_metadata();
    println!("File: {}", probe.path.display());
    if let Some(ref format) = probe.format_name {
        println!("Container: {}", format);
    }
    let secs = meta.duration_secs;
    println!(
        "Duration: {:02}:{:02}:{:06.3}",
        (secs / 3600.0) as u64,
        ((secs / 60.0) as u64) % 60,
        secs % 60.0
    );
    match meta.dimensions() {
        Some((w, h)) => println!("Frame size: {}x{}", w, h),
        None => println!("Frame size: none (no video stream)"),
    }

    println!("\nStreams: {}", probe.streams.len());
    for stream in &probe.streams {
        print!(
            "  [{}] {:?} {}",
            stream.index,
            stream.kind,
            stream.codec.as_deref().unwrap_or("?")
        );
        if let (Some(w), Some(h)) = (stream.width, stream.height) {
            print!(" {}x{}", w, h);
        }
        if let Some(ch) = stream.channels {
            print!(" {}ch", ch);
        }
        if let Some(rate) = stream.sample_rate {
            print!(" {} Hz", rate);
        }
        if let Some(ref lang) = stream.language {
            print!(" ({})", lang);
        }
        println!();
    }

    Ok(())
}

async fn normalize(config: config::Config, input: &Path, output: &Path) -> Result<()> {
    let written = Clipforge::from_config(config)?
        .normalize_audio(input, output)
        .await?;
    println!("{}", written.display());
    Ok(())
}

async fn extract_audio(config: config::Config, input: &Path, output_dir: &Path) -> Result<()> {
    let tracks = Clipforge::from_config(config)?
        .extract_audio_tracks(input, output_dir)
        .await?;
    for track in tracks {
        println!("{}", track.display());
    }
    Ok(())
}

async fn encode_mp3(config: config::Config, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let stdin_input = input == Path::new("-");
    let output = output.unwrap_or_else(|| {
        if stdin_input {
            PathBuf::from("-")
        } else {
            input.with_extension("mp3")
        }
    });
    let forge = Clipforge::from_config(config)?;

    if !stdin_input && output != Path::new("-") {
        let written = forge.encode_mp3(input, &output).await?;
        println!("{}", written.display());
        return Ok(());
    }

    let data = if stdin_input {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read audio from stdin")?;
        buf
    } else {
        std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?
    };

    let mp3 = forge.encode_mp3_bytes(data).await?;

    if output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&mp3)?;
        stdout.flush()?;
    } else {
        std::fs::write(&output, &mp3).with_context(|| format!("Failed to write {:?}", output))?;
        println!("{}", output.display());
    }
    Ok(())
}

fn check_tools(config: &config::Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = clipforge::ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable merging and audio jobs.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration loaded with {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {}", warning);
        }
    }

    println!("  Fade: {}s ({})", config.merge.fade_duration_secs, config.merge.transition);
    println!("  Strict fade: {}", config.merge.strict_fade);
    println!(
        "  Speech audio: {} Hz, {} ch; MP3 {}",
        config.audio.sample_rate, config.audio.channels, config.audio.mp3_bitrate
    );

    Ok(())
}
