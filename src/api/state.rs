//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::assistant::ChatBackend;
use crate::feed::EntryTable;
use crate::websocket::{spawn_change_bridge, ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Feed entries and their change feed
    pub table: Arc<EntryTable>,
    /// Backend behind the `/api/ai` proxy
    pub assistant: Arc<dyn ChatBackend>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for push notifications
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(table: Arc<EntryTable>, assistant: Arc<dyn ChatBackend>, config: ApiConfig) -> Self {
        Self::with_ws_config(table, assistant, config, HubConfig::default())
    }

    /// Create AppState with custom WebSocket hub configuration
    pub fn with_ws_config(
        table: Arc<EntryTable>,
        assistant: Arc<dyn ChatBackend>,
        config: ApiConfig,
        hub_config: HubConfig,
    ) -> Self {
        Self {
            table,
            assistant,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        }
    }

    /// Start pushing table inserts to WebSocket subscribers
    pub fn start_change_bridge(&self) -> JoinHandle<()> {
        spawn_change_bridge(&self.table, Arc::clone(&self.ws_hub))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Whether a presented key is acceptable. Always true when no key is configured.
    pub fn key_matches(&self, presented: Option<&str>) -> bool {
        match self.config.public_key.as_deref() {
            None => true,
            Some(expected) => presented == Some(expected),
        }
    }

    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Key required on entry routes and `/ws`, if any
    pub public_key: Option<String>,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            public_key: None,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ApiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
