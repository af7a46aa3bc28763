//! episync - align subtitle tracks to an episode's timeline
//!
//! Usage:
//!   episync align ep01.mkv --jp ep01.jp.ass --en ep01.en.srt
//!   episync align ep01.mkv --jp ep01.jp.ass --en ep01.en.srt --mode speech --write
//!   episync streams ep01.mkv

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use episync_core::aligner::{AlignRequest, EpisodeAligner, EpisodeAlignment};
use episync_core::config::ConfigManager;
use episync_core::estimate::EstimationResult;
use episync_core::logging::{self, EpisodeLogger, LogConfig, LogLevel};
use episync_core::media::{FfmpegProbe, MediaProbe};
use episync_core::models::{AlignMode, TrackKind};
use episync_core::reference::{score_stream, select_reference_stream};
use episync_core::registry::OffsetRegistry;

/// Estimate constant subtitle offsets for an episode
#[derive(Parser, Debug)]
#[command(name = "episync", author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: .config/episync.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate the JP and EN offsets of an episode
    Align(AlignArgs),

    /// List embedded subtitle streams and the chosen reference
    Streams {
        /// Video file to inspect
        video: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct AlignArgs {
    /// Video file of the episode
    video: PathBuf,

    /// Japanese subtitle file
    #[arg(long)]
    jp: PathBuf,

    /// English subtitle file
    #[arg(long)]
    en: PathBuf,

    /// What to align against: reference or speech
    #[arg(short, long, default_value = "reference")]
    mode: AlignMode,

    /// Episode name (defaults to the video file stem)
    #[arg(short, long)]
    episode: Option<String>,

    /// Lowest candidate offset in milliseconds
    #[arg(long, allow_hyphen_values = true)]
    min_offset_ms: Option<i64>,

    /// Highest candidate offset in milliseconds
    #[arg(long, allow_hyphen_values = true)]
    max_offset_ms: Option<i64>,

    /// Seconds from the start of the episode to sample
    #[arg(long)]
    sample_sec: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Store the offsets in the registry
    #[arg(short, long)]
    write: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(ConfigManager::default_path);
    let mut config = ConfigManager::new(&config_path);
    config
        .load_or_create()
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.settings().logging.level
    };
    let _guard = match config.ensure_dirs_exist() {
        Ok(()) => Some(logging::init_tracing_with_file(level, &config.logs_folder())),
        Err(e) => {
            logging::init_tracing(level);
            tracing::warn!("File logging disabled: {}", e);
            None
        }
    };
    tracing::debug!("Using config {}", config.path().display());

    match cli.command {
        Commands::Align(args) => align(&mut config, args, cli.verbose),
        Commands::Streams { video } => streams(&video),
    }
}

fn align(config: &mut ConfigManager, args: AlignArgs, verbose: bool) -> Result<()> {
    // Overrides apply to this run only
    let search = &mut config.settings_mut().search;
    if let Some(min) = args.min_offset_ms {
        search.min_offset_ms = min;
    }
    if let Some(max) = args.max_offset_ms {
        search.max_offset_ms = max;
    }
    if let Some(sample_sec) = args.sample_sec {
        search.sample_sec = sample_sec;
    }

    let episode = match args.episode {
        Some(name) => name,
        None => episode_name(&args.video)?,
    };

    let mut log_config = LogConfig::from(&config.settings().logging);
    if verbose {
        log_config.level = LogLevel::Debug;
    }
    let logger = EpisodeLogger::new(&episode, config.logs_folder(), log_config)
        .with_context(|| format!("Failed to open log for {}", episode))?;

    let request = AlignRequest {
        episode: episode.clone(),
        video: args.video,
        jp: args.jp,
        en: args.en,
        mode: args.mode,
    };
    logger.section(&format!("{} ({} mode)", episode, request.mode));

    let aligner = EpisodeAligner::new(FfmpegProbe::new(), config.settings());
    let alignment = match aligner.align(&request, Some(&logger)) {
        Ok(alignment) => alignment,
        Err(e) => {
            logger.error(&e.to_string());
            logger.dump_tail("ffmpeg");
            logger.flush();
            return Err(e).with_context(|| format!("Failed to align {}", episode));
        }
    };
    logger.json("Result", &alignment);

    if args.json {
        let json = serde_json::to_string_pretty(&alignment).context("Failed to serialize result")?;
        println!("{}", json);
    } else {
        print_alignment(&alignment);
    }

    if args.write {
        let registry_path = config.registry_path();
        let mut registry = OffsetRegistry::load(&registry_path)?;
        let previous = registry.set(episode.as_str(), alignment.offsets());
        registry.save()?;

        let message = match previous {
            Some(old) => format!(
                "Updated {} in {} (was jp {}ms, en {}ms)",
                episode,
                registry_path.display(),
                old.jp,
                old.en
            ),
            None => format!("Stored {} in {}", episode, registry_path.display()),
        };
        logger.success(&message);
        if !args.json {
            println!("{}", message);
        }
    }

    logger.close();
    Ok(())
}

fn streams(video: &Path) -> Result<()> {
    let probe = FfmpegProbe::new();
    let streams = probe
        .list_subtitle_streams(video)
        .with_context(|| format!("Failed to list subtitle streams of {}", video.display()))?;

    if streams.is_empty() {
        println!("No subtitle streams in {}", video.display());
        return Ok(());
    }

    let selected = select_reference_stream(&streams).map(|s| s.index);
    println!(
        "   {:>5}  {:>6}  {:<10} {:<5} {:<7} title",
        "index", "score", "codec", "lang", "default"
    );
    for stream in &streams {
        let marker = if Some(stream.index) == selected { "*" } else { " " };
        println!(
            "{}  {:>5}  {:>6}  {:<10} {:<5} {:<7} {}",
            marker,
            stream.index,
            score_stream(stream),
            stream.codec_name,
            stream.language,
            if stream.disposition_default { "yes" } else { "no" },
            stream.title
        );
    }

    Ok(())
}

fn print_alignment(alignment: &EpisodeAlignment) {
    println!(
        "{} ({} mode, first {:.1}s)",
        alignment.episode,
        alignment.mode,
        alignment.window_ms as f64 / 1000.0
    );
    if let Some(stream) = &alignment.reference_stream {
        println!(
            "  reference: stream #{} [{}] '{}'",
            stream.index, stream.codec_name, stream.title
        );
    }

    for track in TrackKind::ALL {
        print_track(track, alignment.track(track));
    }
}

fn print_track(track: TrackKind, result: &EstimationResult) {
    let boundary = result
        .boundary_score
        .map(|b| format!(" boundary {:.4}", b))
        .unwrap_or_default();
    println!(
        "  {}: offset {:+}ms  score {:.4}  ratio {:.4}{}  confidence {}",
        track, result.offset_ms, result.score, result.overlap_ratio, boundary, result.confidence
    );
    for (rank, sample) in result.top.iter().enumerate() {
        println!(
            "      #{} {:+}ms score {:.4} ratio {:.4}",
            rank + 1,
            sample.offset_ms,
            sample.score,
            sample.overlap_ratio
        );
    }
}

fn episode_name(video: &Path) -> Result<String> {
    video
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .with_context(|| format!("Cannot derive an episode name from {}", video.display()))
}
