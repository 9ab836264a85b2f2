//! GameVerse CLI
//!
//! Command-line client for a GameVerse server:
//! - Browse the featured games
//! - Ask the assistant
//! - Read, watch and post to the community feed
//! - Manage the local username

use anyhow::Context;
use clap::{Parser, Subcommand};
use gameverse::assistant::{AssistantPanel, ProxyBackend};
use gameverse::catalog;
use gameverse::config::{generate_default_config, Config};
use gameverse::feed::{EntryStore, FeedConfig, FeedEntry, FeedPanel, RemoteEntryStore};
use gameverse::identity::{resolve_username, LocalIdentity};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_API_URL: &str = "http://localhost:8083";

#[derive(Parser)]
#[command(name = "gameverse-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gaming community hub: AI assistant and live community feed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server URL (default: config file, then http://localhost:8083)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Public key sent to the server
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Post under this name instead of the saved one
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the featured games
    Games,

    /// Ask the assistant (interactive when no question is given)
    Ask {
        /// Question to ask
        question: Vec<String>,
    },

    /// Print recent feed entries, newest first
    Feed {
        /// Number of entries
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show the feed and follow new entries until Ctrl+C
    Watch,

    /// Post an entry to the feed
    Post {
        /// Entry text
        text: Vec<String>,
    },

    /// Follow the feed and post every line typed on stdin
    Chat,

    /// Show the username entries are posted under
    Whoami,

    /// Save the username for future posts
    SetName {
        /// New username
        name: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gameverse=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    let mut store_config = config.remote_store_config_with(cli.api_url.clone(), cli.key.clone());
    let api_url = store_config
        .endpoint
        .get_or_insert_with(|| DEFAULT_API_URL.to_string())
        .clone();

    let identity = LocalIdentity::default_location();
    let name_override = cli.name.clone().or_else(|| config.identity.username.clone());

    match cli.command {
        Commands::Games => {
            let games = catalog::games();

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&games)?);
            } else {
                for game in &games {
                    println!("{:<20} #{}", game.name, game.slug);
                    println!("    {}", game.blurb());
                }
            }
        }

        Commands::Ask { question } => {
            let proxy_url = cli
                .api_url
                .clone()
                .or_else(|| config.assistant.proxy_url.clone())
                .unwrap_or_else(|| api_url.clone());
            let mut panel = AssistantPanel::new(ProxyBackend::new(proxy_url));

            let question = question.join(" ");
            if !question.trim().is_empty() {
                if let Some(reply) = panel.submit(&question).await {
                    println!("{}", reply.content);
                }
            } else {
                println!("Ask anything about your games. Empty line or Ctrl+D to quit.");
                let mut lines = BufReader::new(tokio::io::stdin()).lines();
                while let Some(line) = lines.next_line().await? {
                    if line.trim().is_empty() {
                        break;
                    }
                    println!("...");
                    if let Some(reply) = panel.submit(&line).await {
                        println!("AI: {}", reply.content);
                    }
                }
            }
        }

        Commands::Feed { limit } => {
            let store = RemoteEntryStore::new(store_config);
            let entries = store
                .recent(limit)
                .await
                .with_context(|| format!("Cannot read the feed from {}", api_url))?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No posts yet. Be the first:");
                println!("  gameverse-cli post \"gg\"");
            } else {
                for entry in &entries {
                    print_entry(entry);
                }
            }
        }

        Commands::Watch => {
            let username = resolve_username(name_override.as_deref(), &identity);
            let mut panel = FeedPanel::new(
                RemoteEntryStore::new(store_config),
                username,
                FeedConfig::default(),
            );

            panel.activate().await;
            for entry in panel.view().to_vec().iter().rev() {
                print_entry(entry);
            }

            loop {
                tokio::select! {
                    entry = panel.next_live() => match entry {
                        Some(entry) => print_entry(&entry),
                        None => {
                            eprintln!("Live updates unavailable from {}", api_url);
                            break;
                        }
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            panel.deactivate();
        }

        Commands::Post { text } => {
            let username = resolve_username(name_override.as_deref(), &identity);
            let panel = FeedPanel::new(
                RemoteEntryStore::new(store_config),
                username,
                FeedConfig::default(),
            );

            match panel.submit(&text.join(" ")).await? {
                Some(entry) => println!("Posted as {}", entry.author),
                None => {
                    eprintln!("Nothing to post");
                    std::process::exit(1);
                }
            }
        }

        Commands::Chat => {
            let username = resolve_username(name_override.as_deref(), &identity);
            let mut panel = FeedPanel::new(
                RemoteEntryStore::new(store_config),
                username,
                FeedConfig::default(),
            );

            panel.activate().await;
            for entry in panel.view().to_vec().iter().rev() {
                print_entry(entry);
            }
            println!("-- chatting as {} (Ctrl+C to leave) --", panel.author());

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                tokio::select! {
                    entry = panel.next_live() => match entry {
                        Some(entry) => print_entry(&entry),
                        None => {
                            eprintln!("Live updates unavailable from {}", api_url);
                            break;
                        }
                    },
                    line = lines.next_line() => match line? {
                        Some(line) => {
                            // The post shows up through the live stream
                            if let Err(e) = panel.submit(&line).await {
                                eprintln!("Post failed: {}", e);
                            }
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            panel.deactivate();
        }

        Commands::Whoami => {
            println!("{}", resolve_username(name_override.as_deref(), &identity));
        }

        Commands::SetName { name } => {
            identity.save(&name)?;
            println!("Saved username to {:?}", identity.path());
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn print_entry(entry: &FeedEntry) {
    println!(
        "[{}] {}: {}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.author,
        entry.content
    );
}
