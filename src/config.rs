//! Configuration management for chat-flow.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::session::StoreConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ops server configuration.
    pub server: ServerSection,
    /// Session store configuration.
    pub store: StoreSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Ops server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Session store configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Durable backend connection string.
    pub redis_url: String,
    /// Namespace prefix for every stored key.
    pub key_prefix: String,
    /// Session record time-to-live in seconds.
    pub ttl_secs: u64,
    /// Bound on the one-time backend connection attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Bound on each backend call, in seconds.
    pub op_timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "chatflow:".to_string(),
            ttl_secs: 3600,
            connect_timeout_secs: 2,
            op_timeout_secs: 2,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("CHAT_FLOW_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("CHAT_FLOW_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("CHAT_FLOW_REDIS_URL") {
            if !url.is_empty() {
                self.store.redis_url = url;
            }
        }

        if let Ok(prefix) = std::env::var("CHAT_FLOW_KEY_PREFIX") {
            if !prefix.is_empty() {
                self.store.key_prefix = prefix;
            }
        }

        if let Ok(ttl) = std::env::var("CHAT_FLOW_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                self.store.ttl_secs = ttl;
            }
        }

        if let Ok(level) = std::env::var("CHAT_FLOW_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        self.server.host = args.host.to_string();
        self.server.port = args.port;

        if let Some(ref url) = args.redis_url {
            self.store.redis_url = url.clone();
        }

        if let Some(ttl) = args.ttl_secs {
            self.store.ttl_secs = ttl;
        }

        if let Some(ref prefix) = args.key_prefix {
            self.store.key_prefix = prefix.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Config::default();

        // Load from config file if specified
        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        // Apply environment variable overrides
        config.apply_env();

        // Apply CLI argument overrides (highest priority)
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to StoreConfig for the session store.
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            url: self.store.redis_url.clone(),
            key_prefix: self.store.key_prefix.clone(),
            ttl: Duration::from_secs(self.store.ttl_secs),
            connect_timeout: Duration::from_secs(self.store.connect_timeout_secs),
            op_timeout: Duration::from_secs(self.store.op_timeout_secs),
        }
    }

    /// Convert to ServerConfig for the ops API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        Ok(ServerConfig::new(host.to_string(), self.server.port))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
        }
    }
}

impl std::error::Error for ConfigError {}
