//! # rusty-spotify-adapter-spotify
//!
//! Spotify adapter — the collaborator module the capability registrar binds.
//!
//! ## Responsibilities
//! - Talk to the Spotify Web API (`SpotifyApi`): token refresh, play, pause,
//!   volume, playback state and device listing
//! - Wire playback control onto a capability object (`SpotifyAccessory`)
//! - Expose one accessory per Spotify Connect device (`SpotifyPlatform`)
//! - Build both from host-provided configuration (`SpotifyModule`)
//!
//! ## Dependency rule
//! Depends on `rusty-spotify-app` (ports) and `rusty-spotify-domain`.

pub mod accessory;
pub mod api;
pub mod config;
pub mod error;
pub mod platform;

use std::sync::Arc;
use std::time::Duration;

use rusty_spotify_app::capability::PlatformBinding;
use rusty_spotify_app::ports::{AccessoryPlugin, HostArgs, PlatformPlugin, PluginModule};
use rusty_spotify_domain::error::BridgeError;
use rusty_spotify_domain::service::Service;

pub use accessory::SpotifyAccessory;
pub use api::SpotifyApi;
pub use config::{AccessoryType, SpotifyConfig};
pub use error::SpotifyError;
pub use platform::SpotifyPlatform;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds Spotify accessories and platforms from host configuration.
#[derive(Debug, Clone)]
pub struct SpotifyModule {
    client: reqwest::Client,
}

impl SpotifyModule {
    /// Create a module with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Http`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, SpotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("rusty-spotify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SpotifyError::Http)?;
        Ok(Self::with_client(client))
    }

    /// Create a module sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn api(&self, config: &SpotifyConfig) -> Arc<SpotifyApi> {
        Arc::new(SpotifyApi::new(self.client.clone(), config))
    }
}

impl PluginModule for SpotifyModule {
    fn construct_accessory(
        &self,
        capability: Service,
        args: HostArgs,
    ) -> Result<Box<dyn AccessoryPlugin>, BridgeError> {
        let config = SpotifyConfig::from_value(&args.config)?;
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| capability.display_name().to_string());
        args.log.in_scope(|| {
            tracing::info!(
                name = %name,
                service = %capability.service_type(),
                device_id = config.device_id.as_deref(),
                "creating Spotify accessory"
            );
        });
        let accessory = SpotifyAccessory::new(
            capability,
            name,
            config.device_id.clone(),
            self.api(&config),
            args.log,
        )?;
        Ok(Box::new(accessory))
    }

    fn construct_platform(
        &self,
        binding: PlatformBinding,
        args: HostArgs,
    ) -> Result<Box<dyn PlatformPlugin>, BridgeError> {
        let config = SpotifyConfig::from_value(&args.config)?;
        let service_type = config.service_type_or(
            binding
                .default_capability
                .as_ref()
                .map(Service::service_type),
        );
        args.log.in_scope(|| {
            tracing::info!(
                %service_type,
                refresh_rate_ms = config.refresh_rate,
                "creating Spotify platform"
            );
        });
        let platform = SpotifyPlatform::new(
            binding,
            self.api(&config),
            service_type,
            config.refresh_interval(),
            args.log,
        );
        Ok(Box::new(platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rusty_spotify_app::bridge::{LocalAccessoryRegistry, LocalHap};
    use rusty_spotify_app::capability::CapabilityContext;
    use rusty_spotify_domain::characteristic::{CharacteristicType, CharacteristicValue};
    use rusty_spotify_domain::error::ValidationError;
    use rusty_spotify_domain::service::ServiceType;

    fn credentials() -> serde_json::Value {
        serde_json::json!({
            "client_id": "client",
            "client_secret": "secret",
            "refresh_token": "refresh-1",
        })
    }

    fn capabilities() -> CapabilityContext {
        CapabilityContext::new(Arc::new(LocalHap::default()))
    }

    #[test]
    fn should_build_accessory_around_bound_capability() {
        let module = SpotifyModule::with_client(reqwest::Client::new());
        let light = capabilities().create_light("SpotifyAccessory").unwrap();
        let mut config = credentials();
        config["name"] = serde_json::json!("Living room");

        let accessory = module
            .construct_accessory(light.clone(), HostArgs::new(tracing::Span::none(), config))
            .unwrap();

        let services = accessory.services();
        assert_eq!(services.len(), 1);
        assert!(services[0].same_as(&light));
        let brightness = light.characteristic(CharacteristicType::Brightness).unwrap();
        assert!(brightness.has_get_handler());
        assert!(brightness.has_set_handler());
        assert_eq!(
            light.characteristic(CharacteristicType::Name).unwrap().value(),
            CharacteristicValue::from("Living room")
        );
    }

    #[test]
    fn should_reject_invalid_accessory_config() {
        let module = SpotifyModule::with_client(reqwest::Client::new());
        let light = capabilities().create_light("SpotifyAccessory").unwrap();

        let result = module.construct_accessory(
            light,
            HostArgs::new(tracing::Span::none(), serde_json::json!({ "name": "x" })),
        );

        assert!(matches!(
            result,
            Err(BridgeError::Validation(ValidationError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn should_build_platform() {
        let module = SpotifyModule::with_client(reqwest::Client::new());
        let registry = Arc::new(LocalAccessoryRegistry::default());
        let binding = PlatformBinding {
            host: registry.clone(),
            capabilities: capabilities(),
            default_capability: None,
        };

        let platform = module.construct_platform(
            binding,
            HostArgs::new(tracing::Span::none(), credentials()),
        );

        assert!(platform.is_ok());
        assert!(registry.accessories().is_empty());
    }

    #[tokio::test]
    async fn should_expose_devices_as_bound_default_capability() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"token-1","token_type":"Bearer","expires_in":3600}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/me/player/devices")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"devices":[{"id":"kitchen","name":"Kitchen","volume_percent":35}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/me/player")
            .with_status(204)
            .create_async()
            .await;

        let module = SpotifyModule::with_client(reqwest::Client::new());
        let registry = Arc::new(LocalAccessoryRegistry::default());
        let binding = PlatformBinding {
            host: registry.clone(),
            capabilities: capabilities(),
            default_capability: Some(capabilities().create_speaker("SpotifyAccessory").unwrap()),
        };
        let mut config = credentials();
        config["accounts_url"] = serde_json::json!(server.url());
        config["api_url"] = serde_json::json!(server.url());

        let platform = module
            .construct_platform(binding, HostArgs::new(tracing::Span::none(), config))
            .unwrap();
        platform.did_finish_launching();
        for _ in 0..200 {
            if !registry.accessories().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        platform.shutdown();

        let accessories = registry.accessories();
        assert_eq!(accessories.len(), 1);
        assert!(accessories[0].get_service(ServiceType::Speaker).is_some());
    }
}
