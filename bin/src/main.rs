//! malaga CLI binary.
//!
//! Runs the momentum, value, equal-weight and Monte Carlo screens from the
//! command line and writes their results as CSV.

mod cmd;
mod config;
mod data;
mod export;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::CommonArgs;
use cmd::monte_carlo::SimulationArgs;
use config::StrategyConfig;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "malaga")]
#[command(about = "Momentum, value and equal-weight stock screens", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// High-quality momentum screen
    Momentum {
        /// Use 1W/2W/4W/12W horizons instead of 1M/3M/6M/1Y
        #[arg(long)]
        weekly: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Robust value screen
    Value {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Equal-weight index share counts
    EqualWeight {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Monte Carlo portfolio simulation
    MonteCarlo {
        /// Ticker symbol(s)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Number of simulated paths
        #[arg(long)]
        simulations: Option<usize>,

        /// Trading days per path
        #[arg(short = 'H', long)]
        horizon: Option<usize>,

        /// RNG seed for reproducible paths
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List index constituents
    Universe {
        /// Number of symbols printed
        #[arg(long, default_value = "50")]
        limit: usize,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List available strategies
    Strategies,

    /// Print the default configuration as TOML
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = StrategyConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Momentum { weekly, common } => {
            cmd::momentum::run(&config, weekly, &common).await?;
        }
        Commands::Value { common } => {
            cmd::value::run(&config, &common).await?;
        }
        Commands::EqualWeight { common } => {
            cmd::equal_weight::run(&config, &common).await?;
        }
        Commands::MonteCarlo {
            symbols,
            simulations,
            horizon,
            seed,
            common,
        } => {
            let sim = SimulationArgs {
                symbols,
                simulations,
                horizon,
                seed,
            };
            cmd::monte_carlo::run(&config, &sim, &common).await?;
        }
        Commands::Universe { limit, common } => {
            cmd::universe::run(&config, &common, limit).await?;
        }
        Commands::Strategies => {
            cmd::strategies::list_strategies(cli.verbose);
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
