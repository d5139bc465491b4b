//! graphbench - graph database benchmark runner
//!
//! Loads a benchmark configuration, then runs massive insertion for every
//! database ordering and repetition it selects.

mod error;
mod metrics;
mod report;
mod runner;

use std::path::{Path, PathBuf};

use clap::Parser;
use libgraphbench_core::{BenchmarkConfiguration, Settings};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use error::Result;
use runner::{BackendLoader, Runner};

/// Looked up in order when `--config` is not given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config/bench.properties", "config/bench.toml"];

#[derive(Parser)]
#[command(name = "graphbench")]
#[command(about = "Benchmark graph databases with a common insertion workload")]
#[command(version)]
struct Cli {
    /// Configuration file (.properties or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Validate the configuration and print the plan without loading anything
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = match config_path(cli.config.as_deref()) {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            Some(Settings::load(&path)?)
        }
        None => None,
    };
    let config = BenchmarkConfiguration::from_source(settings.as_ref())?;

    let mut runner = Runner::new(&config, BackendLoader::new(&config));

    if cli.dry_run {
        let plan = runner.plan();
        info!(
            "{} scenario(s), {} load(s) planned into {}",
            config.scenarios(),
            plan.len(),
            config.results_path().display()
        );
        for planned in plan {
            info!(
                "scenario {} repetition {}: {}",
                planned.scenario + 1,
                planned.repetition,
                planned.database
            );
        }
        return Ok(());
    }

    let written = runner.run()?;
    info!("benchmark finished, {} report(s) written", written.len());
    Ok(())
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}
