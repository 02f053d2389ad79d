use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use azicorr::adapter::synthetic::SyntheticSource;
use azicorr::adapter::{self, EventSource, JsonSink};
use azicorr::analysis::engine::CorrelationEngine;
use azicorr::core::domain::{CatalogMode, EngineConfig};
use azicorr::runner::{self, RunOptions};

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Two-particle azimuthal correlation analysis for heavy-ion events",
    long_about = None
)]
struct Args {
    /// Input event file (JSON-lines or CSV)
    input: String,

    /// Output file for the accumulated results (JSON)
    output: PathBuf,

    /// Input format: auto, ampt, hadron_before_art, hadron_before_melting,
    /// zpc, parton_initial, legacy, or synthetic
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Analysis preset (pool or profile)
    #[arg(short, long, default_value = "profile")]
    preset: String,

    /// Number of worker threads for sharded batch processing
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Checkpoint file; omit to disable periodic checkpoints
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Events between checkpoints
    #[arg(long, default_value_t = 50)]
    checkpoint_every: u64,

    /// Per-event particle capacity; defaults to the format's bound
    #[arg(long)]
    max_particles: Option<usize>,

    /// Species mode for the synthetic source (hadron or parton)
    #[arg(long, default_value = "hadron")]
    mode: String,

    /// Event count for the synthetic source
    #[arg(long, default_value_t = 1000)]
    events: usize,

    /// Seed for the synthetic source
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

// --- Wiring ---

fn parse_mode(name: &str) -> Result<CatalogMode> {
    match name.to_lowercase().as_str() {
        "hadron" => Ok(CatalogMode::Hadron),
        "parton" => Ok(CatalogMode::Parton),
        other => bail!("unknown mode '{other}' (expected hadron or parton)"),
    }
}

fn build_config(args: &Args, mode: CatalogMode, format_bound: usize) -> Result<EngineConfig> {
    let mut config = match args.preset.to_lowercase().as_str() {
        "pool" => EngineConfig::pool_analysis(mode),
        "profile" => EngineConfig::profile_analysis(mode),
        other => bail!("unknown preset '{other}' (expected pool or profile)"),
    };
    config.max_particles = args.max_particles.unwrap_or(format_bound);
    Ok(config)
}

fn open_source(args: &Args) -> Result<(Box<dyn EventSource>, CatalogMode, usize)> {
    if args.format == "synthetic" {
        let mode = parse_mode(&args.mode)?;
        let source = SyntheticSource::new(mode, args.events, args.seed);
        return Ok((
            Box::new(source),
            mode,
            azicorr::core::domain::DEFAULT_MAX_PARTICLES,
        ));
    }

    let (source, spec) = adapter::open(Path::new(&args.input), &args.format)?;
    info!("input format: {} (stream '{}')", spec.name, spec.stream);
    Ok((source, spec.mode(), spec.max_particles))
}

fn run_analysis(args: &Args) -> Result<()> {
    let timer = Instant::now();

    let (mut source, mode, format_bound) = open_source(args)?;
    let config = build_config(args, mode, format_bound)?;
    info!(
        "analysis stream '{}' ({} preset)",
        config.label, args.preset
    );

    let checkpoint_sink = args.checkpoint.as_ref().map(JsonSink::new);
    let final_sink = JsonSink::new(&args.output);

    let store = if args.threads > 1 && config.mixing.is_none() {
        // Sharded path: load the batch, split across the pool, merge.
        let mut events = Vec::new();
        while let Some(event) = source.next_event()? {
            events.push(event);
        }
        info!(
            "loaded {} events; sharding across {} threads",
            events.len(),
            args.threads
        );
        runner::run_sharded(&config, &events, args.threads)?
    } else {
        let mut engine = CorrelationEngine::new(config);
        let opts = RunOptions {
            checkpoint_every: args.checkpoint_every,
            ..RunOptions::default()
        };
        let processed = runner::run(
            &mut engine,
            source.as_mut(),
            checkpoint_sink.as_ref().map(|s| s as &dyn adapter::ResultSink),
            &opts,
        )?;
        info!("processed {processed} events");
        engine.into_store()
    };

    store
        .write_all(&final_sink)
        .with_context(|| format!("failed to save results to {}", args.output.display()))?;

    info!(
        "analysis completed in {:.2}s, results saved to {}",
        timer.elapsed().as_secs_f64(),
        args.output.display()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run_analysis(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
