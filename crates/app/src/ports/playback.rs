//! Playback port — control of the music service on behalf of an accessory.

use std::future::Future;

use rusty_spotify_domain::error::BridgeError;
use rusty_spotify_domain::playback::{PlaybackState, SpotifyDevice};

/// Volume reported when the music service cannot tell.
pub const FALLBACK_VOLUME: u8 = 100;

/// Remote control of the user's playback.
pub trait PlaybackApi: Send + Sync {
    /// Start or resume playback, optionally on a specific device.
    fn play(&self, device_id: Option<&str>)
    -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Pause playback on the active device.
    fn pause(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Current playback, or `None` when nothing is active.
    fn playback_state(
        &self,
    ) -> impl Future<Output = Result<Option<PlaybackState>, BridgeError>> + Send;

    /// Set the volume of `device_id`, or of the active device when `None`.
    fn set_volume(
        &self,
        percent: u8,
        device_id: Option<&str>,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Devices currently available to the account.
    fn devices(&self) -> impl Future<Output = Result<Vec<SpotifyDevice>, BridgeError>> + Send;

    /// Whether music is playing, on `device_id` when given.
    fn is_playing(
        &self,
        device_id: Option<&str>,
    ) -> impl Future<Output = Result<bool, BridgeError>> + Send {
        async move {
            Ok(self
                .playback_state()
                .await?
                .is_some_and(|state| state.is_playing_on(device_id)))
        }
    }

    /// Volume of `device_id`, or of the active device when `None`.
    ///
    /// Falls back to [`FALLBACK_VOLUME`] when the device reports none.
    fn volume(
        &self,
        device_id: Option<&str>,
    ) -> impl Future<Output = Result<u8, BridgeError>> + Send {
        async move {
            let volume = match device_id {
                Some(id) => self
                    .devices()
                    .await?
                    .into_iter()
                    .find(|device| device.id.as_deref() == Some(id))
                    .and_then(|device| device.volume_percent),
                None => self
                    .playback_state()
                    .await?
                    .and_then(|state| state.device.volume_percent),
            };
            Ok(volume.unwrap_or(FALLBACK_VOLUME))
        }
    }
}
