//! GameVerse Server
//!
//! Run with: cargo run --bin gameverse
//!
//! Hosts the community feed (SQLite table, REST routes and `/ws` push) and
//! the `/api/ai` assistant proxy.
//!
//! # Configuration
//!
//! Read from `--config`, or `~/.config/gameverse/config.toml`, or
//! `./gameverse.toml`. Environment variables override the file:
//! - `GAMEVERSE_HOST`: Host to bind to (default: 0.0.0.0)
//! - `GAMEVERSE_PORT`: Port to listen on (default: 8083)
//! - `GAMEVERSE_DATA_DIR`: Directory holding gameverse.db
//! - `GAMEVERSE_STORE_KEY`: Key required on entry routes and `/ws`
//! - `OPENAI_API_KEY`: Hosted chat credential (assistant replies fail without it)
//! - `GAMEVERSE_MODEL`: Chat model (default: gpt-4o-mini)
//! - `GAMEVERSE_LOG_LEVEL`, `GAMEVERSE_LOG_FORMAT`: Logging (`RUST_LOG` wins)

use clap::Parser;
use gameverse::api::{serve, AppState};
use gameverse::assistant::OpenAiClient;
use gameverse::config::{Config, LoggingConfig};
use gameverse::feed::EntryTable;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gameverse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GameVerse community feed and assistant server")]
struct Args {
    /// Config file (default: search the usual locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting GameVerse server v{}", env!("CARGO_PKG_VERSION"));

    let db_path = config.database_path();
    tracing::info!("Entry table: {:?}", db_path);
    let table = Arc::new(EntryTable::open(&db_path)?);
    tracing::info!(entries = table.count()?, "Entry table ready");

    let assistant = OpenAiClient::new(config.openai_config());
    if assistant.has_credential() {
        tracing::info!(model = %config.assistant.model, "Assistant proxy enabled");
    } else {
        tracing::warn!("OPENAI_API_KEY not set, assistant requests will get the fallback reply");
    }

    let api_config = config.api_config();
    if api_config.public_key.is_none() {
        tracing::info!("No public key configured, entry routes are open");
    }

    let state = AppState::new(Arc::clone(&table), Arc::new(assistant), api_config.clone());

    serve(state, &api_config).await?;

    tracing::info!("GameVerse server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("gameverse={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
