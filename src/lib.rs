//! # GameVerse
//!
//! A gaming community hub: an AI assistant panel plus a realtime community
//! feed, served by a small Axum server and driven from a terminal client.
//!
//! ## Features
//!
//! - **Assistant**: multi-turn chat with a hosted model, proxied so the
//!   credential stays on the server
//! - **Community feed**: newest-first history reconciled with live inserts
//!   pushed over WebSocket, without duplicates
//! - **Catalogue**: the featured games and their anchor slugs
//!
//! ## Modules
//!
//! - [`assistant`]: Chat backends and the assistant panel
//! - [`feed`]: Entry storage, subscriptions and the feed panel
//! - [`catalog`]: Featured games
//! - [`identity`]: Locally saved username
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Push channel for feed inserts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gameverse::feed::{FeedConfig, FeedPanel, RemoteEntryStore, RemoteStoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RemoteEntryStore::new(RemoteStoreConfig {
//!         endpoint: Some("http://localhost:8083".to_string()),
//!         public_key: None,
//!     });
//!
//!     let mut feed = FeedPanel::new(store, "anon", FeedConfig::default());
//!     feed.activate().await;
//!
//!     feed.submit("anyone up for ranked?").await?;
//!     while let Some(entry) = feed.next_live().await {
//!         println!("{}: {}", entry.author, entry.content);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod identity;
pub mod websocket;

// Re-export top-level types for convenience
pub use assistant::{
    AssistantError, AssistantPanel, ChatBackend, ChatTurn, OpenAiClient, OpenAiConfig,
    ProxyBackend, Role, FALLBACK_REPLY,
};

pub use feed::{
    EntryStore, EntryTable, FeedConfig, FeedEntry, FeedPanel, FeedView, LocalEntryStore,
    NewEntry, RemoteEntryStore, RemoteStoreConfig, StoreError, StoreResult, Subscription,
    SubscriptionState,
};

pub use catalog::{games, slugify, Game};

pub use identity::{resolve_username, IdentityError, LocalIdentity, ANONYMOUS};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError};
