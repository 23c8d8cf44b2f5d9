use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squad_board::api::{build_router, state::AppState};
use squad_board::calculate::ranking::{rank_players, RankingKey};
use squad_board::config::{AppConfig, API_KEY_ENV};
use squad_board::provider::HenrikClient;
use squad_board::seed::{load_manifest, seed_players};
use squad_board::storage::{Database, StorageConfig, Store};
use squad_board::update::{spawn_periodic, UpdateCycle};

#[derive(Parser)]
#[command(name = "squad-board")]
#[command(about = "Leaderboard service for a fixed roster of Valorant players")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Tick in-process at this interval (e.g., "5m")
        #[arg(long)]
        schedule: Option<String>,
    },

    /// Run one update tick and exit
    Tick,

    /// Upsert the roster from the onboarding manifest
    Seed {
        /// Manifest path (overrides the config file)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Print a leaderboard
    Leaderboard {
        /// Ranking: mmr, kd or composite
        #[arg(long, default_value = "mmr")]
        by: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Path::new(&cli.config);
    let mut config = AppConfig::load_or_default(config_path)
        .with_context(|| format!("Failed to load config {}", cli.config))?;
    config.apply_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting squad-board v{}", env!("CARGO_PKG_VERSION"));
    if !config_path.exists() {
        tracing::warn!("Config file {:?} not found, using defaults", config_path);
    }

    let database = Database::new(StorageConfig::new(config.data_dir.clone()));
    let store = database.connect().await?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            schedule,
        } => {
            let cycle = Arc::new(build_cycle(&config, store)?);

            if schedule.is_some() {
                config.update.schedule = schedule;
            }
            if let Some(raw) = &config.update.schedule {
                let every = config
                    .update
                    .schedule_interval()
                    .filter(|d| !d.is_zero())
                    .with_context(|| format!("Invalid schedule: {}", raw))?;
                spawn_periodic(Arc::clone(&cycle), every);
            }

            let state = AppState::new(cycle, config.roster_manifest.clone())
                .with_cors_origin(&config.server.cors_origin);
            let app = build_router(state);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Shutting down");
                })
                .await?;
        }
        Commands::Tick => {
            let cycle = build_cycle(&config, store)?;
            let report = cycle.tick().await?;

            println!("Updated:            {}", report.display_name);
            println!("Handle:             {}", report.handle);
            println!("Season refreshed:   {}", report.season_updated);
            println!("Recency index:      {}", report.recency_index);
            println!("Team stats updated: {}", report.team_stats_updated);
            if let Some(err) = report.team_error {
                println!("Team stats error:   {}", err);
            }
        }
        Commands::Seed { manifest } => {
            let path = manifest.unwrap_or(config.roster_manifest);
            let entries = load_manifest(&path)?;
            let report = seed_players(store.as_ref(), &entries, chrono::Utc::now()).await?;

            println!(
                "Seeded {} players from {} ({} new, {} refreshed)",
                report.count,
                path.display(),
                report.inserted,
                report.updated
            );
        }
        Commands::Leaderboard { by } => {
            let key: RankingKey = by.parse().map_err(anyhow::Error::msg)?;
            let players = rank_players(store.list_players().await?, key);

            println!("\n=== Leaderboard ({}) ===", key);
            println!(
                "{:<4} {:<20} {:<24} {:<14} {:>6} {:>6}",
                "#", "Name", "Handle", "Rank", "MMR", "K/D"
            );
            for (idx, p) in players.iter().enumerate() {
                println!(
                    "{:<4} {:<20} {:<24} {:<14} {:>6} {:>6.2}",
                    idx + 1,
                    p.display_name,
                    p.handle,
                    p.rank,
                    p.mmr,
                    p.kd
                );
            }
            if players.is_empty() {
                println!("(no players; run `squad-board seed` first)");
            }
        }
    }

    Ok(())
}

fn build_cycle(config: &AppConfig, store: Arc<dyn Store>) -> Result<UpdateCycle> {
    if config.provider.api_key.is_none() {
        tracing::warn!(
            "No provider API key configured; set {} or provider.api_key",
            API_KEY_ENV
        );
    }

    let client = HenrikClient::new(config.provider.client_config())?;
    Ok(UpdateCycle::new(
        store,
        Arc::new(client),
        config.update.settings(),
    ))
}
