//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::assistant::OpenAiConfig;
use crate::feed::RemoteStoreConfig;

/// Database file inside the data directory
const DATABASE_FILE: &str = "gameverse.db";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Key clients must present on entry routes and `/ws`
    pub public_key: Option<String>,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8083
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_key: None,
            max_body_size: default_max_body_size(),
        }
    }
}

/// Entry store configuration
///
/// The server keeps its table under `data_dir`; clients reach a server
/// through `endpoint`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Base URL of a GameVerse server
    pub endpoint: Option<String>,

    /// Key sent with every request to `endpoint`
    pub public_key: Option<String>,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("gameverse").to_string_lossy().to_string())
        .unwrap_or_else(|| "./gameverse_data".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            endpoint: None,
            public_key: None,
        }
    }
}

/// Assistant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Hosted API credential; only the server needs it
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Server whose `/api/ai` proxy clients should use
    pub proxy_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_request_timeout() -> u64 {
    60_000
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
            proxy_url: None,
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// Identity configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Overrides the username saved on this machine
    pub username: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("gameverse").join("config.toml")),
            Some(PathBuf::from("./gameverse.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = lookup("GAMEVERSE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GAMEVERSE_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid GAMEVERSE_PORT"),
            }
        }

        // Store overrides; the key is shared by server and clients
        if let Some(data_dir) = lookup("GAMEVERSE_DATA_DIR") {
            self.store.data_dir = data_dir;
        }
        if let Some(url) = lookup("GAMEVERSE_STORE_URL") {
            self.store.endpoint = Some(url.clone());
            self.assistant.proxy_url.get_or_insert(url);
        }
        if let Some(key) = lookup("GAMEVERSE_STORE_KEY") {
            self.store.public_key = Some(key.clone());
            self.server.public_key = Some(key);
        }

        // Assistant overrides
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.assistant.api_key = Some(key);
        }
        if let Some(model) = lookup("GAMEVERSE_MODEL") {
            self.assistant.model = model;
        }

        // Identity overrides
        if let Some(username) = lookup("GAMEVERSE_USERNAME") {
            self.identity.username = Some(username);
        }

        // Logging overrides
        if let Some(level) = lookup("GAMEVERSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GAMEVERSE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Path of the server's SQLite database. A leading `~/` in `data_dir`
    /// is the home directory.
    pub fn database_path(&self) -> PathBuf {
        expand_home(&self.store.data_dir).join(DATABASE_FILE)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            public_key: self.server.public_key.clone(),
            max_body_size: self.server.max_body_size,
        }
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.assistant.api_key.clone(),
            model: self.assistant.model.clone(),
            api_base: self.assistant.api_base.clone(),
            request_timeout_ms: self.assistant.request_timeout_ms,
        }
    }

    pub fn remote_store_config(&self) -> RemoteStoreConfig {
        RemoteStoreConfig {
            endpoint: self.store.endpoint.clone(),
            public_key: self.store.public_key.clone(),
        }
    }

    /// Remote store settings with command-line values taking precedence
    pub fn remote_store_config_with(
        &self,
        endpoint: Option<String>,
        public_key: Option<String>,
    ) -> RemoteStoreConfig {
        let mut store = self.remote_store_config();
        if endpoint.is_some() {
            store.endpoint = endpoint;
        }
        if public_key.is_some() {
            store.public_key = public_key;
        }
        store
    }
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# GameVerse Configuration
#
# Environment variables override these settings:
# - GAMEVERSE_HOST, GAMEVERSE_PORT
# - GAMEVERSE_DATA_DIR
# - GAMEVERSE_STORE_URL, GAMEVERSE_STORE_KEY
# - OPENAI_API_KEY, GAMEVERSE_MODEL
# - GAMEVERSE_USERNAME
# - GAMEVERSE_LOG_LEVEL, GAMEVERSE_LOG_FORMAT

[server]
# Server host
host = "0.0.0.0"

# Server port
port = 8083

# Key clients must send as the `apikey` header (or `?apikey=` on /ws)
# public_key = ""

# Maximum request body size (bytes)
max_body_size = 1048576

[store]
# Directory holding gameverse.db (server only).
# Defaults to the platform data directory, e.g. ~/.local/share/gameverse
# data_dir = "~/.local/share/gameverse"

# Server the client reads and posts entries through
endpoint = "http://localhost:8083"

# public_key = ""

[assistant]
# Hosted API credential (server only); prefer OPENAI_API_KEY
# api_key = ""

# Model used for replies
model = "gpt-4o-mini"

# OpenAI-compatible API base
api_base = "https://api.openai.com/v1"

# Server whose /api/ai proxy the client uses
proxy_url = "http://localhost:8083"

# Request timeout (ms)
request_timeout_ms = 60000

[identity]
# Overrides the saved username
# username = "anon"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8083);
        assert_eq!(config.assistant.model, "gpt-4o-mini");
        assert!(config.assistant.api_key.is_none());
        assert!(config.store.endpoint.is_none());
        assert!(config.database_path().ends_with("gameverse.db"));
    }

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 8083);
        assert_eq!(config.store.endpoint.as_deref(), Some("http://localhost:8083"));
        assert_eq!(config.logging.format, "pretty");
        assert!(!config.database_path().starts_with("~"));
        assert_eq!(config.store.data_dir, default_data_dir());
    }

    #[test]
    fn test_data_dir_tilde_expands_to_home() {
        let config = Config::parse(
            r#"
            [store]
            data_dir = "~/games/gameverse"
            "#,
        )
        .unwrap();

        let path = config.database_path();
        assert!(!path.starts_with("~"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("games/gameverse").join("gameverse.db"));
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [server]
            port = 9000

            [identity]
            username = "xXsniperXx"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.identity.username.as_deref(), Some("xXsniperXx"));
        assert_eq!(config.assistant.request_timeout_ms, 60_000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("GAMEVERSE_PORT", "9100"),
            ("GAMEVERSE_STORE_URL", "http://feed.local"),
            ("GAMEVERSE_STORE_KEY", "pk"),
            ("OPENAI_API_KEY", "sk-test"),
            ("GAMEVERSE_USERNAME", "cli-user"),
        ]));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.store.endpoint.as_deref(), Some("http://feed.local"));
        assert_eq!(config.assistant.proxy_url.as_deref(), Some("http://feed.local"));
        assert_eq!(config.store.public_key.as_deref(), Some("pk"));
        assert_eq!(config.server.public_key.as_deref(), Some("pk"));
        assert_eq!(config.assistant.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.identity.username.as_deref(), Some("cli-user"));
    }

    #[test]
    fn test_invalid_port_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("GAMEVERSE_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8083);
    }

    #[test]
    fn test_explicit_proxy_url_not_replaced() {
        let mut config = Config::parse(
            r#"
            [assistant]
            proxy_url = "http://ai.local"
            "#,
        )
        .unwrap();
        config.apply_overrides(lookup_from(&[("GAMEVERSE_STORE_URL", "http://feed.local")]));

        assert_eq!(config.assistant.proxy_url.as_deref(), Some("http://ai.local"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gameverse.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.logging.level, "debug");

        let missing = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_conversions() {
        let mut config = Config::default();
        config.server.public_key = Some("pk".to_string());
        config.assistant.api_key = Some("sk".to_string());

        assert_eq!(config.api_config().public_key.as_deref(), Some("pk"));
        assert_eq!(config.api_config().port, 8083);
        assert_eq!(config.openai_config().api_key.as_deref(), Some("sk"));
        assert!(config.remote_store_config().endpoint.is_none());
    }

    #[test]
    fn test_remote_store_overrides() {
        let config = Config::parse(
            r#"
            [store]
            endpoint = "http://feed.local"
            public_key = "from-file"
            "#,
        )
        .unwrap();

        let from_file = config.remote_store_config_with(None, None);
        assert_eq!(from_file.endpoint.as_deref(), Some("http://feed.local"));
        assert_eq!(from_file.public_key.as_deref(), Some("from-file"));

        let overridden =
            config.remote_store_config_with(Some("http://cli.local".to_string()), None);
        assert_eq!(overridden.endpoint.as_deref(), Some("http://cli.local"));
        assert_eq!(overridden.public_key.as_deref(), Some("from-file"));

        let keyed = config.remote_store_config_with(None, Some("from-cli".to_string()));
        assert_eq!(keyed.public_key.as_deref(), Some("from-cli"));
    }
}
