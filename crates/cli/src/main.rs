//! fx-convert - derive and query cross rates from configured observations

mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fx_core::{AppConfig, FeedError, FeedResult, Pair};
use fx_feed::{FnFeed, FxConverter, RateFeed};

#[derive(Debug, Parser)]
#[command(name = "fx-convert", version, about = "Derive cross rates from observed currency pairs")]
struct Cli {
    /// TOML configuration file holding the observed pairs
    #[arg(short, long, default_value = "fx.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the derived rate FROM -> TO
    Query { from: String, to: String },
    /// Convert AMOUNT of FROM into TO
    Convert { amount: f64, from: String, to: String },
    /// Print every derived pair
    Table {
        #[arg(long)]
        json: bool,
    },
    /// Print currencies and directed edges of the rate graph
    Graph,
    /// Keep reloading the configuration on the refresh interval until Ctrl+C
    Watch,
}

/// Feed that re-reads the observations from the configuration file on every fetch
fn config_feed(path: PathBuf) -> impl RateFeed {
    FnFeed::new("config-file", move || -> FeedResult<Vec<Pair>> {
        let config = AppConfig::load(&path).map_err(|e| FeedError::Unavailable {
            name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let now = Utc::now();
        Ok(config
            .observations
            .iter()
            .map(|o| Pair::new(o.from.clone(), o.to.clone(), o.rate, now))
            .collect())
    })
}

async fn watch(converter: &FxConverter, interval: Duration) -> anyhow::Result<()> {
    let handle = converter.spawn_refresh(interval);
    info!("Watching {}; press Ctrl+C to stop", converter.feed_name());

    signal::ctrl_c().await?;
    info!("Received Ctrl+C");

    handle.stop().await?;
    println!("{}", commands::render_table(&converter.snapshot().table));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting fx-convert v{}", env!("CARGO_PKG_VERSION"));

    // One-shot commands fail on invalid input; only `watch` tolerates a bad load.
    let rates = || commands::build_rates(&config);

    match cli.command {
        Command::Query { from, to } => {
            let (_, table) = rates()?;
            println!("{}", commands::render_query(&table, &from, &to));
        }
        Command::Convert { amount, from, to } => {
            let (_, table) = rates()?;
            println!("{}", commands::render_convert(&table, amount, &from, &to));
        }
        Command::Table { json } => {
            let (_, table) = rates()?;
            if json {
                println!("{}", commands::render_table_json(&table)?);
            } else {
                println!("{}", commands::render_table(&table));
            }
        }
        Command::Graph => {
            let (graph, _) = rates()?;
            println!("{}", commands::render_graph(&graph));
        }
        Command::Watch => {
            let feed = Arc::new(config_feed(cli.config.clone()));
            let converter = FxConverter::new(feed, &config.converter);
            watch(&converter, config.converter.refresh_interval()).await?;
        }
    }

    Ok(())
}
