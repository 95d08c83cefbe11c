//! Server configuration loading from file and environment variables.

use musee_media::{AudioPolicy, MediaSettings, DEFAULT_MAX_UPLOAD_BYTES};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Media storage settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Demo data settings.
    #[serde(default)]
    pub seed: SeedConfig,
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
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "musee_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Media storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory under which `targets/`, `overlays/` and `audio/` live.
    #[serde(default = "default_media_root")]
    pub root: PathBuf,

    /// Largest accepted single upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Accepted audio extensions, lowercase and without the dot.
    /// An empty list accepts any audio file.
    #[serde(default = "default_audio_extensions")]
    pub allowed_audio_extensions: Vec<String>,
}

/// Demo data configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Insert the demo catalog at startup if it is not already there.
    #[serde(default)]
    pub demo: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "musee.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_audio_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
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

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_audio_extensions: default_audio_extensions(),
        }
    }
}

impl MediaConfig {
    /// Converts the file-level settings into store settings.
    pub fn settings(&self) -> MediaSettings {
        MediaSettings {
            max_upload_bytes: self.max_upload_bytes,
            audio_policy: AudioPolicy::from_extensions(&self.allowed_audio_extensions),
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
/// - `MUSEE_HOST` overrides `server.host`
/// - `MUSEE_PORT` overrides `server.port`
/// - `MUSEE_DB_PATH` overrides `database.path`
/// - `MUSEE_LOG_LEVEL` overrides `logging.level`
/// - `MUSEE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `MUSEE_MEDIA_ROOT` overrides `media.root`
/// - `MUSEE_SEED_DEMO` overrides `seed.demo` (set to "true" to enable)
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

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("MUSEE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("MUSEE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = var("MUSEE_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("MUSEE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("MUSEE_LOG_JSON") {
        config.logging.json = is_truthy(&json);
    }
    if let Some(root) = var("MUSEE_MEDIA_ROOT") {
        config.media.root = PathBuf::from(root);
    }
    if let Some(demo) = var("MUSEE_SEED_DEMO") {
        config.seed.demo = is_truthy(&demo);
    }
}

fn is_truthy(value: &str) -> bool {
    value == "true" || value == "1"
}
