use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use farmsim::{
    config::{ConfigLoader, SimulationConfig},
    engine::Engine,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Farm and ranch sustainability simulation")]
struct Cli {
    /// Path to the farm YAML config (built-in defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a headless session as fast as possible and report the outcome
    Run {
        /// Number of time units to simulate
        #[arg(long, default_value_t = 300)]
        units: u64,
    },
    /// Serve the local HTTP bridge for a browser front end
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    match cli.command {
        Command::Run { units } => run_headless(&config, units),
        Command::Serve { host, port } => {
            web::run(WebServerConfig {
                simulation: config,
                host,
                port,
            })
            .await
        }
    }
}

fn run_headless(config: &SimulationConfig, units: u64) -> Result<()> {
    let mut engine = Engine::from_config(config)?;
    engine.start();
    for _ in 0..units {
        engine.advance()?;
    }
    engine.stop();

    let farm = engine.farm();
    let metrics = engine.metrics();
    info!(
        farm = engine.name(),
        seed = engine.seed(),
        units,
        credits = farm.ledger().credits(),
        weather = ?farm.weather().kind,
        sustainability = metrics.sustainability,
        efficiency = metrics.efficiency,
        crop_yield = metrics.crop_yield,
        overall = metrics.overall_sustainability,
        "headless run finished"
    );
    Ok(())
}
