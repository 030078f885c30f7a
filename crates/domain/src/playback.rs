//! Playback records exchanged with the music service.

use serde::{Deserialize, Serialize};

/// A Spotify Connect device able to play music.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyDevice {
    /// Device id; restricted devices may not report one.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub volume_percent: Option<u8>,
}

/// Current playback as reported for the user's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub device: SpotifyDevice,
}

impl PlaybackState {
    /// Whether playback is running, optionally on a specific device.
    #[must_use]
    pub fn is_playing_on(&self, device_id: Option<&str>) -> bool {
        match device_id {
            Some(id) => self.is_playing && self.device.id.as_deref() == Some(id),
            None => self.is_playing,
        }
    }
}
