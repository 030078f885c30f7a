//! Spotify Web API client.
//!
//! Every call authorizes first: the access token is reused for
//! [`ACCESS_TOKEN_LIFETIME_MINUTES`] and refreshed from the long-lived
//! refresh token afterwards.

use std::path::PathBuf;

use chrono::TimeDelta;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{RequestBuilder, Response, StatusCode};
use rusty_spotify_app::ports::PlaybackApi;
use rusty_spotify_domain::error::BridgeError;
use rusty_spotify_domain::playback::{PlaybackState, SpotifyDevice};
use rusty_spotify_domain::time::{self, Timestamp};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::SpotifyConfig;
use crate::error::SpotifyError;

/// Access tokens are issued for an hour; refresh ten minutes early.
pub const ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 50;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<SpotifyDevice>,
}

#[derive(Debug)]
struct AccessToken {
    value: String,
    issued_at: Timestamp,
}

#[derive(Debug)]
struct TokenState {
    access_token: Option<AccessToken>,
    refresh_token: String,
}

/// Client for the player endpoints of the Spotify Web API.
#[derive(Debug)]
pub struct SpotifyApi {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    accounts_url: String,
    api_url: String,
    config_path: Option<PathBuf>,
    token: Mutex<TokenState>,
}

impl SpotifyApi {
    /// Build a client sharing `client`'s connection pool.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &SpotifyConfig) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            accounts_url: config.accounts_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            config_path: config.config_path.clone(),
            token: Mutex::new(TokenState {
                access_token: None,
                refresh_token: config.refresh_token.clone(),
            }),
        }
    }

    /// The refresh token currently in use.
    pub async fn refresh_token(&self) -> String {
        self.token.lock().await.refresh_token.clone()
    }

    /// A valid access token, refreshing it when missing or expired.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Http`] or [`SpotifyError::TokenRequest`] if the
    /// accounts service cannot be reached or refuses the refresh token.
    #[tracing::instrument(skip(self))]
    pub async fn authorize(&self) -> Result<String, SpotifyError> {
        let mut state = self.token.lock().await;

        if let Some(token) = &state.access_token {
            let lifetime = TimeDelta::minutes(ACCESS_TOKEN_LIFETIME_MINUTES);
            if !time::is_expired(token.issued_at, lifetime, time::now()) {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("refreshing Spotify access token");
        let response = self
            .client
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", state.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(SpotifyError::Http)?;

        if !response.status().is_success() {
            return Err(SpotifyError::TokenRequest {
                status: response.status().as_u16(),
            });
        }

        let body: TokenResponse = response.json().await.map_err(SpotifyError::Http)?;

        if let Some(rotated) = body.refresh_token.filter(|t| *t != state.refresh_token) {
            if let Err(err) = self.persist_refresh_token(&state.refresh_token, &rotated).await {
                tracing::warn!(error = %err, "could not persist rotated refresh token");
            }
            state.refresh_token = rotated;
        }

        state.access_token = Some(AccessToken {
            value: body.access_token.clone(),
            issued_at: time::now(),
        });
        Ok(body.access_token)
    }

    async fn persist_refresh_token(
        &self,
        previous: &str,
        rotated: &str,
    ) -> Result<(), SpotifyError> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(SpotifyError::Io)?;
        tokio::fs::write(path, contents.replace(previous, rotated))
            .await
            .map_err(SpotifyError::Io)?;
        tracing::info!(path = %path.display(), "persisted rotated refresh token");
        Ok(())
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, SpotifyError> {
        let token = self.authorize().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(SpotifyError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpotifyError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.client
            .put(format!("{}{path}", self.api_url))
            .header(CONTENT_LENGTH, 0)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{path}", self.api_url))
    }
}

impl PlaybackApi for SpotifyApi {
    #[tracing::instrument(skip(self))]
    async fn play(&self, device_id: Option<&str>) -> Result<(), BridgeError> {
        let mut request = self.put("/v1/me/player/play");
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }
        self.send("play", request).await?;
        tracing::info!("playback started");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn pause(&self) -> Result<(), BridgeError> {
        self.send("pause", self.put("/v1/me/player/pause")).await?;
        tracing::info!("playback paused");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn playback_state(&self) -> Result<Option<PlaybackState>, BridgeError> {
        let response = self.send("playback state", self.get("/v1/me/player")).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let state = response
            .json::<PlaybackState>()
            .await
            .map_err(SpotifyError::Http)?;
        Ok(Some(state))
    }

    #[tracing::instrument(skip(self))]
    async fn set_volume(&self, percent: u8, device_id: Option<&str>) -> Result<(), BridgeError> {
        let mut request = self
            .put("/v1/me/player/volume")
            .query(&[("volume_percent", percent)]);
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }
        self.send("set volume", request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn devices(&self) -> Result<Vec<SpotifyDevice>, BridgeError> {
        let response = self
            .send("devices", self.get("/v1/me/player/devices"))
            .await?;
        let body = response
            .json::<DevicesResponse>()
            .await
            .map_err(SpotifyError::Http)?;
        Ok(body.devices)
    }
}
