//! Spotify plugin configuration, as found in the host's accessory or
//! platform block.

use std::path::PathBuf;
use std::time::Duration;

use rusty_spotify_domain::service::ServiceType;
use serde::Deserialize;

use crate::error::SpotifyError;

/// Default interval between two device refreshes, in milliseconds.
pub const DEFAULT_REFRESH_RATE_MS: u64 = 10_000;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";

/// Capability each Spotify device is exposed as by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessoryType {
    Switch,
    Light,
    Speaker,
}

impl AccessoryType {
    #[must_use]
    pub fn service_type(self) -> ServiceType {
        match self {
            Self::Switch => ServiceType::Switch,
            Self::Light => ServiceType::Lightbulb,
            Self::Speaker => ServiceType::Speaker,
        }
    }
}

/// Configuration shared by the accessory and platform plugins.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    /// Spotify application client id.
    pub client_id: String,
    /// Spotify application client secret.
    pub client_secret: String,
    /// Long-lived refresh token; rotated tokens are written back to
    /// [`config_path`](Self::config_path).
    pub refresh_token: String,
    /// Display name of a single accessory.
    #[serde(default)]
    pub name: Option<String>,
    /// Device a single accessory controls; the active device when absent.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Device refresh interval of the platform, in milliseconds.
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u64,
    /// Capability each device is exposed as by the platform.
    #[serde(default)]
    pub accessory_type: Option<AccessoryType>,
    #[serde(default = "default_accounts_url")]
    pub accounts_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Host configuration file holding `refresh_token`.
    #[serde(default)]
    pub config_path: Option<PathBuf>,
}

fn default_refresh_rate() -> u64 {
    DEFAULT_REFRESH_RATE_MS
}

fn default_accounts_url() -> String {
    DEFAULT_ACCOUNTS_URL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl SpotifyConfig {
    /// Parse and validate a host-provided configuration block.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Config`] if a required field is missing,
    /// blank, or a value is out of range.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SpotifyError> {
        let config =
            Self::deserialize(value).map_err(|err| SpotifyError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), SpotifyError> {
        for (field, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", &self.refresh_token),
        ] {
            if value.trim().is_empty() {
                return Err(SpotifyError::Config(format!("`{field}` must not be empty")));
            }
        }
        if self.refresh_rate == 0 {
            return Err(SpotifyError::Config(
                "`refresh_rate` must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Service type the platform builds per device: the configured
    /// `accessory_type`, then `fallback`, then a light.
    #[must_use]
    pub fn service_type_or(&self, fallback: Option<ServiceType>) -> ServiceType {
        self.accessory_type
            .map(AccessoryType::service_type)
            .or(fallback)
            .unwrap_or(ServiceType::Lightbulb)
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> serde_json::Value {
        serde_json::json!({
            "accessory": "SpotifyAccessory",
            "client_id": "client",
            "client_secret": "secret",
            "refresh_token": "refresh-1",
        })
    }

    #[test]
    fn should_apply_defaults_for_optional_fields() {
        let config = SpotifyConfig::from_value(&minimal()).unwrap();
        assert_eq!(config.client_id, "client");
        assert_eq!(config.refresh_rate, DEFAULT_REFRESH_RATE_MS);
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert!(config.accessory_type.is_none());
        assert_eq!(config.service_type_or(None), ServiceType::Lightbulb);
        assert_eq!(config.accounts_url, DEFAULT_ACCOUNTS_URL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.name.is_none());
        assert!(config.device_id.is_none());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn should_parse_platform_block() {
        let config = SpotifyConfig::from_value(&serde_json::json!({
            "platform": "Spotify",
            "client_id": "client",
            "client_secret": "secret",
            "refresh_token": "refresh-1",
            "refresh_rate": 2500,
            "accessory_type": "speaker",
            "config_path": "/var/lib/homebridge/config.json",
        }))
        .unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_millis(2500));
        assert_eq!(config.accessory_type, Some(AccessoryType::Speaker));
        assert_eq!(
            config.service_type_or(Some(ServiceType::Switch)),
            ServiceType::Speaker
        );
        assert_eq!(
            config.config_path,
            Some(PathBuf::from("/var/lib/homebridge/config.json"))
        );
    }

    #[test]
    fn should_fall_back_to_bound_service_type() {
        let config = SpotifyConfig::from_value(&minimal()).unwrap();
        assert_eq!(
            config.service_type_or(Some(ServiceType::Speaker)),
            ServiceType::Speaker
        );
    }

    #[test]
    fn should_reject_missing_credentials() {
        let result = SpotifyConfig::from_value(&serde_json::json!({ "client_id": "client" }));
        assert!(matches!(result, Err(SpotifyError::Config(_))));
    }

    #[test]
    fn should_reject_blank_refresh_token() {
        let mut value = minimal();
        value["refresh_token"] = serde_json::json!("  ");
        let Err(SpotifyError::Config(reason)) = SpotifyConfig::from_value(&value) else {
            panic!("expected a config error");
        };
        assert!(reason.contains("refresh_token"));
    }

    #[test]
    fn should_reject_zero_refresh_rate() {
        let mut value = minimal();
        value["refresh_rate"] = serde_json::json!(0);
        assert!(matches!(
            SpotifyConfig::from_value(&value),
            Err(SpotifyError::Config(_))
        ));
    }

    #[test]
    fn should_reject_unknown_accessory_type() {
        let mut value = minimal();
        value["accessory_type"] = serde_json::json!("television");
        assert!(matches!(
            SpotifyConfig::from_value(&value),
            Err(SpotifyError::Config(_))
        ));
    }
}
