//! Plugin identity and the capability shapes a user may configure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::characteristic::CharacteristicType;
use crate::service::ServiceType;

/// Package name the host routes configuration and cached accessories by.
pub const PLUGIN_NAME: &str = "homebridge-rusty-spotify";

/// Type name of the single-accessory variants.
pub const ACCESSORY_TYPE_NAME: &str = "SpotifyAccessory";

/// Type name of the platform variant.
pub const PLATFORM_TYPE_NAME: &str = "Spotify";

/// Display name given to the capability object of the accessory variants.
pub const ACCESSORY_DISPLAY_NAME: &str = "SpotifyAccessory";

/// The `(plugin_name, type_name)` pair a registration is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginIdentity {
    pub plugin_name: &'static str,
    pub type_name: &'static str,
}

impl PluginIdentity {
    pub const ACCESSORY: Self = Self {
        plugin_name: PLUGIN_NAME,
        type_name: ACCESSORY_TYPE_NAME,
    };

    pub const PLATFORM: Self = Self {
        plugin_name: PLUGIN_NAME,
        type_name: PLATFORM_TYPE_NAME,
    };
}

impl fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.plugin_name, self.type_name)
    }
}

/// How Spotify playback control is represented to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// On/off only.
    Switch,
    /// On/off with brightness mapped to volume.
    #[default]
    Light,
    /// Mute with volume.
    Speaker,
    /// A platform exposing one capability per Spotify device.
    Platform,
}

impl CapabilityKind {
    /// Identity this kind registers under.
    #[must_use]
    pub fn identity(self) -> PluginIdentity {
        match self {
            Self::Platform => PluginIdentity::PLATFORM,
            Self::Switch | Self::Light | Self::Speaker => PluginIdentity::ACCESSORY,
        }
    }

    /// Service type of the single capability, `None` for the platform.
    #[must_use]
    pub fn service_type(self) -> Option<ServiceType> {
        match self {
            Self::Switch => Some(ServiceType::Switch),
            Self::Light => Some(ServiceType::Lightbulb),
            Self::Speaker => Some(ServiceType::Speaker),
            Self::Platform => None,
        }
    }
}

/// Characteristic that must be attached explicitly so a capability of
/// `service_type` can drive the volume.
#[must_use]
pub fn volume_characteristic_for(service_type: ServiceType) -> Option<CharacteristicType> {
    match service_type {
        ServiceType::Switch => None,
        ServiceType::Lightbulb => Some(CharacteristicType::Brightness),
        ServiceType::Speaker => Some(CharacteristicType::Volume),
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch => f.write_str("switch"),
            Self::Light => f.write_str("light"),
            Self::Speaker => f.write_str("speaker"),
            Self::Platform => f.write_str("platform"),
        }
    }
}
