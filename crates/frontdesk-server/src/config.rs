//! Server configuration loading from file and environment variables.

use frontdesk_agent::AgentConfig;
use frontdesk_store::{MockSizes, StoreOptions, DEFAULT_DATA_FILE};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Mock business data.
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Hosted voice agent.
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for paths no route matches.
    #[serde(default)]
    pub static_dir: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "frontdesk_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the mock data. Generated on first start.
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Record counts used when generating.
    #[serde(default)]
    pub sizes: MockSizes,

    /// Artificial latency added to every store operation.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// How often to pick up external edits to the data file. 0 disables.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory of `.mdx` articles.
    #[serde(default = "default_kb_dir")]
    pub dir: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

fn default_delay_ms() -> u64 {
    300
}

fn default_sync_interval_secs() -> u64 {
    30
}

fn default_kb_dir() -> String {
    frontdesk_knowledge::DEFAULT_KB_DIR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            sizes: MockSizes::default(),
            delay_ms: default_delay_ms(),
            sync_interval_secs: default_sync_interval_secs(),
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: default_kb_dir(),
        }
    }
}

impl StoreConfig {
    pub fn options(&self) -> StoreOptions {
        StoreOptions {
            data_file: Some(PathBuf::from(&self.data_file)),
            sizes: self.sizes,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `FRONTDESK_HOST` overrides `server.host`
/// - `FRONTDESK_PORT` overrides `server.port`
/// - `FRONTDESK_LOG_LEVEL` overrides `logging.level`
/// - `FRONTDESK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `FRONTDESK_DATA_FILE` overrides `store.data_file`
/// - `FRONTDESK_KB_DIR` overrides `knowledge.dir`
/// - `FRONTDESK_AGENT_URL` overrides `agent.url`
/// - `DEEPGRAM_API_KEY` sets `agent.api_key`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("FRONTDESK_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("FRONTDESK_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = var("FRONTDESK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("FRONTDESK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(data_file) = var("FRONTDESK_DATA_FILE") {
        config.store.data_file = data_file;
    }
    if let Some(dir) = var("FRONTDESK_KB_DIR") {
        config.knowledge.dir = dir;
    }
    if let Some(url) = var("FRONTDESK_AGENT_URL") {
        config.agent.url = url;
    }
    if let Some(key) = var("DEEPGRAM_API_KEY") {
        config.agent.api_key = Some(key);
    }
}
