use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

use tsngen::config_loader::{self, CliOverrides};
use tsngen::orchestrator::generate_test_cases;

/// Topology synthesis and routing for Time-Sensitive Network test fixtures
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the generation configuration (YAML or legacy JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Streams file to route in every test case
    #[arg(short, long)]
    streams: Option<PathBuf>,

    /// Base seed; test case `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory, overrides `general.output_directory`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Starting tsngen");
    info!("Configuration file: {:?}", args.config);

    let mut config = config_loader::load_config(&args.config)?;
    let overrides = CliOverrides {
        output_directory: args.output.as_ref().map(|p| p.to_string_lossy().into_owned()),
    };
    config_loader::apply_overrides(&mut config, &overrides)?;

    let streams = match &args.streams {
        Some(path) => Some(config_loader::load_streams(path)?),
        None => None,
    };

    let summaries = generate_test_cases(&config, streams.as_ref(), args.seed)?;

    for summary in &summaries {
        info!(
            "{}: {} switches, {} end systems, {} links -> {:?}",
            summary.name, summary.switches, summary.end_systems, summary.links, summary.directory
        );
        if !summary.validation_errors.is_empty() {
            warn!(
                "{}: {} integrity problem(s) found",
                summary.name,
                summary.validation_errors.len()
            );
        }
    }
    info!("Done: {} test case(s) written to {}", summaries.len(), config.general.output_directory);

    Ok(())
}
