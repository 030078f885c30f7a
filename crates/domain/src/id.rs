//! Deterministic accessory identifiers.
//!
//! The host restores dynamically registered accessories from its own cache by
//! UUID, so the UUID of an accessory must be derivable from a stable base
//! string (its name, or `type:name`) rather than random.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace for UUID v5 generation of accessory identifiers.
const ACCESSORY_NAMESPACE: uuid::Uuid =
    uuid::Uuid::from_u128(0x6f2e_8a1c_4b7d_5e90_a3c1_92d4_7b0e_15f6);

/// Unique identifier for a [`PlatformAccessory`](crate::accessory::PlatformAccessory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessoryUuid(uuid::Uuid);

impl AccessoryUuid {
    /// Derive the identifier for `base`. Equal inputs give equal UUIDs.
    #[must_use]
    pub fn generate(base: &str) -> Self {
        Self(uuid::Uuid::new_v5(&ACCESSORY_NAMESPACE, base.as_bytes()))
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for AccessoryUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccessoryUuid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_same_uuid_for_same_base() {
        let a = AccessoryUuid::generate("Kitchen Speaker");
        let b = AccessoryUuid::generate("Kitchen Speaker");
        assert_eq!(a, b);
    }

    #[test]
    fn should_generate_different_uuid_for_different_base() {
        let a = AccessoryUuid::generate("Kitchen Speaker");
        let b = AccessoryUuid::generate("Living Room");
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = AccessoryUuid::generate("Spotify");
        let parsed: AccessoryUuid = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_return_error_when_parsing_invalid_uuid() {
        assert!(AccessoryUuid::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn should_produce_version_five_uuid() {
        let id = AccessoryUuid::generate("Spotify");
        assert_eq!(id.as_uuid().get_version_num(), 5);
    }
}
