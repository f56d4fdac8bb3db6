//! dicebet roll provider binary
//!
//! Serves `GET /roll-dice` for the betting client.

use clap::Parser;
use dicebet::{
    api::server::{ApiConfig, ApiServer},
    config::ConfigLoader,
    games::provider,
    logging,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dicebet-api")]
#[command(about = "Dice roll provider for dicebet", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Seed the roll generator for reproducible sequences
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the /metrics endpoint
    #[arg(long)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;

    // Command-line flags win over file and environment
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(origins) = args.cors_origins {
        config.server.allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
    }
    if let Some(timeout) = args.timeout {
        config.server.request_timeout_secs = timeout;
    }
    if args.seed.is_some() {
        config.provider.seed = args.seed;
    }
    if args.no_metrics {
        config.monitoring.enable_metrics = false;
    }
    config.validate()?;

    logging::init_tracing(&logging::default_filter(config.monitoring.log_level.as_str()));

    if let Some(seed) = config.provider.seed {
        info!("Using seeded roll generator (seed {})", seed);
    }
    let provider = provider::from_seed(config.provider.seed);

    let server = ApiServer::new(ApiConfig::from(&config), provider);
    server.run().await?;

    Ok(())
}
