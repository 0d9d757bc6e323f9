//! Pulseboard Server
//!
//! Run with: cargo run --bin pulseboard
//!
//! # Configuration
//!
//! Settings come from `--config`, or the first of
//! `~/.config/pulseboard/config.toml`, `/etc/pulseboard/config.toml` and
//! `./config.toml`, with `PULSEBOARD_*` environment overrides on top.
//! Command-line flags win over both. `RUST_LOG` overrides the log filter.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulseboard::admin::{AdminRegistry, SimulatedTransport, Submitter};
use pulseboard::api::{serve, AppState};
use pulseboard::campaigns::CampaignRegistry;
use pulseboard::config::{generate_default_config, Config, LoggingConfig};
use pulseboard::feed::{spawn_feed, Dashboard, FeedGenerator, SystemClock};
use pulseboard::websocket::ConnectionHub;

#[derive(Parser)]
#[command(name = "pulseboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live dashboard server for a crowdfunding platform")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible donation feed
    #[arg(long)]
    seed: Option<u64>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the default config file and exit
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::PrintConfig) = args.command {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let (mut config, source) = match &args.config {
        Some(path) => (
            Config::load_with_env(path)
                .with_context(|| format!("loading config from {:?}", path))?,
            Some(path.clone()),
        ),
        None => Config::load_default().context("loading default config")?,
    };
    if let Some(seed) = args.seed {
        config.feed.seed = Some(seed);
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate()?;

    init_tracing(&config.logging);

    tracing::info!("Starting Pulseboard v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }
    tracing::info!(
        seed = ?config.feed.seed,
        min_interval_ms = config.feed.min_interval_ms,
        max_interval_ms = config.feed.max_interval_ms,
        "Feed configuration"
    );

    let hub = Arc::new(ConnectionHub::new(config.api.hub_config()));

    // Live feed
    let generator = FeedGenerator::new(config.generator_config()?, config.feed.seed)?;
    let dashboard = Dashboard::new(config.dashboard_config(), generator)?;
    let feed = spawn_feed(dashboard, Arc::new(SystemClock), Arc::clone(&hub))?;

    // Admin console and campaigns share one submitter
    let submitter = Submitter::new(Arc::new(SimulatedTransport::new(
        config.submission_delays(),
    )))
    .retries(config.submissions.max_retries, config.retry_backoff());

    let admins = Arc::new(AdminRegistry::seeded(submitter.clone()));
    let campaigns = Arc::new(CampaignRegistry::seeded(
        config.factory_address()?,
        submitter,
    ));

    let state = AppState::new(feed.watch(), admins, campaigns, hub, config.api.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    let served = serve(state).await;

    tracing::info!("Stopping live feed...");
    let dashboard = feed.shutdown().await?;
    tracing::info!(
        pending_timers = dashboard.pending_timers(),
        total_raised = dashboard.total_raised(),
        "Pulseboard stopped"
    );

    served?;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("pulseboard={},tower_http=debug", logging.level).into()
    });

    let json = logging.is_json();
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}
