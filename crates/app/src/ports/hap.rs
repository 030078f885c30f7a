//! HAP registry port — the service/characteristic types, UUID generator and
//! accessory base the host makes available to plugins.

use std::sync::Arc;

use rusty_spotify_domain::accessory::PlatformAccessory;
use rusty_spotify_domain::characteristic::CharacteristicType;
use rusty_spotify_domain::error::{BridgeError, HostApiError};
use rusty_spotify_domain::id::AccessoryUuid;
use rusty_spotify_domain::service::{Service, ServiceType};

/// Type registry exposed by the host.
///
/// Implementors only report which types they know; construction is shared.
pub trait HapRegistry: Send + Sync {
    /// Whether the host knows `service_type`.
    fn supports_service(&self, service_type: ServiceType) -> bool;

    /// Whether the host knows `characteristic`.
    fn supports_characteristic(&self, characteristic: CharacteristicType) -> bool;

    /// Construct a service of `service_type` with its default characteristics.
    ///
    /// # Errors
    ///
    /// Returns [`HostApiError::MissingService`] if the host does not know the
    /// type, or a validation error for a blank name.
    fn create_service(
        &self,
        service_type: ServiceType,
        display_name: &str,
    ) -> Result<Service, BridgeError> {
        if !self.supports_service(service_type) {
            return Err(HostApiError::MissingService(service_type).into());
        }
        Ok(Service::new(service_type, display_name)?)
    }

    /// Derive a stable accessory UUID from `base`.
    fn generate_uuid(&self, base: &str) -> AccessoryUuid {
        AccessoryUuid::generate(base)
    }

    /// Construct an empty platform accessory.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name.
    fn create_accessory(
        &self,
        display_name: &str,
        uuid: AccessoryUuid,
    ) -> Result<PlatformAccessory, BridgeError> {
        Ok(PlatformAccessory::new(display_name, uuid)?)
    }
}

impl<T: HapRegistry + ?Sized> HapRegistry for Arc<T> {
    fn supports_service(&self, service_type: ServiceType) -> bool {
        (**self).supports_service(service_type)
    }

    fn supports_characteristic(&self, characteristic: CharacteristicType) -> bool {
        (**self).supports_characteristic(characteristic)
    }

    fn create_service(
        &self,
        service_type: ServiceType,
        display_name: &str,
    ) -> Result<Service, BridgeError> {
        (**self).create_service(service_type, display_name)
    }

    fn generate_uuid(&self, base: &str) -> AccessoryUuid {
        (**self).generate_uuid(base)
    }

    fn create_accessory(
        &self,
        display_name: &str,
        uuid: AccessoryUuid,
    ) -> Result<PlatformAccessory, BridgeError> {
        (**self).create_accessory(display_name, uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SwitchOnlyHap;

    impl HapRegistry for SwitchOnlyHap {
        fn supports_service(&self, service_type: ServiceType) -> bool {
            service_type == ServiceType::Switch
        }

        fn supports_characteristic(&self, characteristic: CharacteristicType) -> bool {
            characteristic == CharacteristicType::On
        }
    }

    #[test]
    fn should_create_supported_service() {
        let service = SwitchOnlyHap
            .create_service(ServiceType::Switch, "Spotify")
            .unwrap();
        assert_eq!(service.service_type(), ServiceType::Switch);
    }

    #[test]
    fn should_fail_for_unknown_service_type() {
        let result = SwitchOnlyHap.create_service(ServiceType::Speaker, "Spotify");
        assert!(matches!(
            result,
            Err(BridgeError::HostApi(HostApiError::MissingService(
                ServiceType::Speaker
            )))
        ));
    }

    #[test]
    fn should_generate_deterministic_uuids() {
        assert_eq!(
            SwitchOnlyHap.generate_uuid("Kitchen"),
            AccessoryUuid::generate("Kitchen")
        );
    }

    #[test]
    fn should_delegate_through_arc() {
        let hap: Arc<dyn HapRegistry> = Arc::new(SwitchOnlyHap);
        assert!(hap.supports_service(ServiceType::Switch));
        assert!(hap.create_service(ServiceType::Lightbulb, "Spotify").is_err());
    }

    /// Host with its own UUID scheme and accessory naming.
    struct PrefixedHap;

    impl HapRegistry for PrefixedHap {
        fn supports_service(&self, _service_type: ServiceType) -> bool {
            true
        }

        fn supports_characteristic(&self, _characteristic: CharacteristicType) -> bool {
            true
        }

        fn create_service(
            &self,
            service_type: ServiceType,
            display_name: &str,
        ) -> Result<Service, BridgeError> {
            Ok(Service::new(service_type, &format!("hap {display_name}"))?)
        }

        fn generate_uuid(&self, base: &str) -> AccessoryUuid {
            AccessoryUuid::generate(&format!("hap:{base}"))
        }

        fn create_accessory(
            &self,
            display_name: &str,
            uuid: AccessoryUuid,
        ) -> Result<PlatformAccessory, BridgeError> {
            Ok(PlatformAccessory::new(&format!("hap {display_name}"), uuid)?)
        }
    }

    #[test]
    fn should_forward_overridden_methods_through_arc() {
        let hap = Arc::new(PrefixedHap);

        let uuid = HapRegistry::generate_uuid(&hap, "Kitchen");
        assert_eq!(uuid, AccessoryUuid::generate("hap:Kitchen"));

        let service = HapRegistry::create_service(&hap, ServiceType::Switch, "Kitchen").unwrap();
        assert_eq!(service.display_name(), "hap Kitchen");

        let accessory = HapRegistry::create_accessory(&hap, "Kitchen", uuid).unwrap();
        assert_eq!(accessory.display_name(), "hap Kitchen");
    }
}
