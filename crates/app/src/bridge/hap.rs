//! In-process HAP registry.

use std::collections::HashSet;

use rusty_spotify_domain::characteristic::CharacteristicType;
use rusty_spotify_domain::service::ServiceType;

use crate::ports::HapRegistry;

const ALL_SERVICES: [ServiceType; 3] = [
    ServiceType::Switch,
    ServiceType::Lightbulb,
    ServiceType::Speaker,
];

const ALL_CHARACTERISTICS: [CharacteristicType; 5] = [
    CharacteristicType::On,
    CharacteristicType::Brightness,
    CharacteristicType::Volume,
    CharacteristicType::Mute,
    CharacteristicType::Name,
];

/// Type registry that knows every service and characteristic unless told
/// otherwise.
#[derive(Debug, Clone)]
pub struct LocalHap {
    services: HashSet<ServiceType>,
    characteristics: HashSet<CharacteristicType>,
}

impl Default for LocalHap {
    fn default() -> Self {
        Self {
            services: ALL_SERVICES.into_iter().collect(),
            characteristics: ALL_CHARACTERISTICS.into_iter().collect(),
        }
    }
}

impl LocalHap {
    /// Drop `service_type`, mimicking an older host.
    #[must_use]
    pub fn without_service(mut self, service_type: ServiceType) -> Self {
        self.services.remove(&service_type);
        self
    }

    #[must_use]
    pub fn without_characteristic(mut self, characteristic: CharacteristicType) -> Self {
        self.characteristics.remove(&characteristic);
        self
    }
}

impl HapRegistry for LocalHap {
    fn supports_service(&self, service_type: ServiceType) -> bool {
        self.services.contains(&service_type)
    }

    fn supports_characteristic(&self, characteristic: CharacteristicType) -> bool {
        self.characteristics.contains(&characteristic)
    }
}
