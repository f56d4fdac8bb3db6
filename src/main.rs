//! dicebet terminal client
//!
//! Plays the dice betting game from the command line, fetching rolls from a
//! dicebet-api instance (or an in-process generator with `--local`).

use clap::Parser;
use dicebet::{
    client::{HttpRollSource, LocalRollSource, RollSource},
    config::ConfigLoader,
    games::{provider, DiceTable},
    logging,
    shell::{self, Command, ShellError},
};
use std::{io::Write, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dicebet")]
#[command(about = "Bet on a six-sided die: 4-6 wins, 1-3 loses", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Roll provider URL
    #[arg(long)]
    provider_url: Option<String>,

    /// Provider request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Roll in-process instead of calling the provider
    #[arg(long)]
    local: bool,

    /// Seed for the in-process generator (implies --local)
    #[arg(long)]
    seed: Option<u64>,

    /// Log at the configured level instead of warnings only
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;

    if let Some(url) = args.provider_url {
        config.client.provider_url = url;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.client.request_timeout_ms = timeout_ms;
    }
    if args.seed.is_some() {
        config.provider.seed = args.seed;
    }
    config.validate()?;

    let level = if args.verbose {
        config.monitoring.log_level.as_str()
    } else {
        "warn"
    };
    logging::init_tracing(&logging::default_filter(level));

    let source: Arc<dyn RollSource> = if args.local || args.seed.is_some() {
        info!("Rolling in-process");
        Arc::new(LocalRollSource::new(provider::from_seed(config.provider.seed)))
    } else {
        info!("Rolling via {}", config.client.provider_url);
        Arc::new(HttpRollSource::new(
            &config.client.provider_url,
            config.client.request_timeout(),
        )?)
    };
    let table = DiceTable::new(config.engine.clone(), source, config.client.request_timeout());

    println!("🎲 Dice Betting Game");
    println!("Roll 4, 5 or 6 to win your bet. Type 'help' for commands.");
    println!("{}", shell::render_status(&table));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match shell::parse_command(&line) {
            Ok(command) => command,
            Err(ShellError::Engine(e)) => {
                println!("⚠️  {}", e);
                continue;
            }
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match shell::execute(&table, command).await {
            Ok(output) => println!("{}", output),
            Err(e) if e.is_provider_failure() => {
                println!("Could not reach the roll provider: {}. Your bet was not settled.", e);
            }
            Err(e) => println!("⚠️  {}", e),
        }
    }

    println!("Final balance: ${}", shell::format_amount(table.balance()));
    Ok(())
}
