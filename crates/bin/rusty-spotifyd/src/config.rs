//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `rusty-spotify.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.
//!
//! `[[accessories]]` and `[[platforms]]` tables are handed to the plugin
//! untouched, as JSON values.

use std::path::{Path, PathBuf};

use rusty_spotify_app::bridge::{DEFAULT_API_VERSION, PluginEntry};
use rusty_spotify_domain::error::{BridgeError, ValidationError};
use rusty_spotify_domain::plugin::CapabilityKind;
use serde::Deserialize;

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = "rusty-spotify.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Host bridge settings.
    pub bridge: BridgeConfig,
    /// Accessory blocks, each carrying an `accessory` type key.
    pub accessories: Vec<toml::Table>,
    /// Platform blocks, each carrying a `platform` type key.
    pub platforms: Vec<toml::Table>,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// In-process host settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name the bridge announces itself with.
    pub name: String,
    /// Host API version reported to the plugin.
    pub version: String,
    /// Capability registered for `[[accessories]]` blocks.
    pub capability: CapabilityKind,
}

impl Config {
    /// Load configuration from `rusty-spotify.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
                config.source = Some(path.to_path_buf());
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RUSTY_SPOTIFY_HOST") {
            self.server.host = val;
        }
        if let Some(port) = std::env::var("RUSTY_SPOTIFY_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.server.port = port;
        }
        if let Some((host, port)) = std::env::var("RUSTY_SPOTIFY_BIND")
            .ok()
            .as_deref()
            .and_then(|val| val.rsplit_once(':'))
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("RUSTY_SPOTIFY_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.bridge.capability == CapabilityKind::Platform {
            return Err(ConfigError::Validation(
                "bridge.capability must be switch, light or speaker".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Capability kinds the plugin must be initialised with.
    ///
    /// The accessory capability is always registered so a bridge with no
    /// blocks still exposes the registration; the platform only when
    /// `[[platforms]]` blocks exist.
    #[must_use]
    pub fn capabilities(&self) -> Vec<CapabilityKind> {
        let mut kinds = vec![self.bridge.capability];
        if !self.platforms.is_empty() {
            kinds.push(CapabilityKind::Platform);
        }
        kinds
    }

    /// Convert the configured blocks into launch entries.
    ///
    /// Blocks without an explicit `config_path` point at the file this
    /// configuration was loaded from, so a rotated refresh token lands there.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Entry`] when a block lacks its type key.
    pub fn plugin_entries(&self) -> Result<Vec<PluginEntry>, ConfigError> {
        let accessories = self
            .accessories
            .iter()
            .map(|table| PluginEntry::accessory(self.to_plugin_config(table)?));
        let platforms = self
            .platforms
            .iter()
            .map(|table| PluginEntry::platform(self.to_plugin_config(table)?));
        accessories
            .chain(platforms)
            .collect::<Result<_, _>>()
            .map_err(ConfigError::Entry)
    }

    fn to_plugin_config(&self, table: &toml::Table) -> Result<serde_json::Value, BridgeError> {
        let mut value = serde_json::to_value(table)
            .map_err(|err| ValidationError::InvalidConfig(err.to_string()))?;
        if let (Some(object), Some(source)) = (value.as_object_mut(), &self.source) {
            object
                .entry("config_path")
                .or_insert_with(|| serde_json::Value::from(source.display().to_string()));
        }
        Ok(value)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8581,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "rusty_spotifyd=info,rusty_spotify=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: "Rusty Spotify".to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            capability: CapabilityKind::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A plugin block could not be turned into a launch entry.
    #[error("invalid plugin block")]
    Entry(#[source] BridgeError),
}
