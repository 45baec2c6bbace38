//! Neutryx RNG CLI - Command Line Operations for the RNG Library
//!
//! Operational entry point for sampling from the generator facade.
//!
//! # Commands
//!
//! - `neutryx-rng generate` - Draw samples and write them as JSON, CSV or a table
//! - `neutryx-rng check` - Report the status of every generator type
//! - `neutryx-rng version` - Print library and header versions
//!
//! # Configuration
//!
//! Settings are resolved from CLI arguments, `NEUTRYX_RNG_*` environment
//! variables, an optional TOML file and defaults, in that order of priority.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::generate::{Distribution, GenerateRequest};
use config::{build_config, CliArgs};

/// Neutryx RNG Library CLI
#[derive(Parser)]
#[command(name = "neutryx-rng")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "NEUTRYX_RNG_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw samples from a generator
    Generate {
        /// Generator type (e.g. xorwow, philox4x32-10, sobol32)
        #[arg(short = 't', long = "type")]
        rng_type: Option<String>,

        /// Run on the calling thread instead of a stream
        #[arg(long)]
        host: bool,

        /// Pseudo-random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Absolute offset of the first sample
        #[arg(short, long)]
        offset: Option<u64>,

        /// Quasi-random dimension count
        #[arg(short, long)]
        dimensions: Option<u32>,

        /// Worker threads of a dedicated stream
        #[arg(long)]
        threads: Option<usize>,

        /// Output format (json, csv, table)
        #[arg(short, long)]
        format: Option<String>,

        /// Distribution to sample
        #[arg(long, value_enum, default_value = "uniform")]
        distribution: Distribution,

        /// Number of values to generate
        #[arg(short = 'n', long, default_value = "16")]
        count: usize,

        /// Mean of the normal or log-normal distribution
        #[arg(long, default_value = "0.0")]
        mean: f64,

        /// Standard deviation of the normal or log-normal distribution
        #[arg(long, default_value = "1.0")]
        stddev: f64,

        /// Mean of the Poisson distribution
        #[arg(long, default_value = "1.0")]
        lambda: f64,

        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check every generator type under both residencies
    Check,

    /// Print library and header versions
    Version,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut args = CliArgs {
        config_file: cli.config.clone(),
        log_level: cli.log_level.clone(),
        ..Default::default()
    };
    if let Commands::Generate {
        rng_type,
        host,
        seed,
        offset,
        dimensions,
        threads,
        format,
        ..
    } = &cli.command
    {
        args.rng_type = rng_type.clone();
        args.host = *host;
        args.seed = *seed;
        args.offset = *offset;
        args.dimensions = *dimensions;
        args.threads = *threads;
        args.format = format.clone();
    }
    if cli.verbose && args.log_level.is_none() {
        args.log_level = Some("debug".to_string());
    }

    let config = build_config(&args).context("Failed to load configuration")?;
    init_tracing(config.log_level.as_filter_str());
    debug!(?config, "Configuration resolved");

    match cli.command {
        Commands::Generate {
            distribution,
            count,
            mean,
            stddev,
            lambda,
            output,
            ..
        } => {
            let request = GenerateRequest {
                distribution,
                count,
                mean,
                stddev,
                lambda,
                output,
            };
            commands::generate::validate(&request)?;
            commands::generate::run(&config, &request).context("Generation failed")?;
        }
        Commands::Check => commands::check::run()?,
        Commands::Version => commands::version::run()?,
    }

    info!("Done");
    Ok(())
}
