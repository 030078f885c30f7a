//! Platform accessory — the unit a platform publishes to (and withdraws
//! from) the host.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::characteristic::lock;
use crate::error::ValidationError;
use crate::id::AccessoryUuid;
use crate::service::{Service, ServiceType};

struct Inner {
    uuid: AccessoryUuid,
    display_name: String,
    services: Mutex<Vec<Service>>,
}

/// Shared handle to an accessory and the services it exposes.
#[derive(Clone)]
pub struct PlatformAccessory {
    inner: Arc<Inner>,
}

impl PlatformAccessory {
    /// Create an accessory without services.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `display_name` is blank.
    pub fn new(display_name: &str, uuid: AccessoryUuid) -> Result<Self, ValidationError> {
        if display_name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            inner: Arc::new(Inner {
                uuid,
                display_name: display_name.to_string(),
                services: Mutex::new(Vec::new()),
            }),
        })
    }

    #[must_use]
    pub fn uuid(&self) -> AccessoryUuid {
        self.inner.uuid
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.inner.display_name
    }

    /// Attach a service. The same capability object is never added twice.
    pub fn add_service(&self, service: Service) {
        let mut services = lock(&self.inner.services);
        if !services.iter().any(|s| s.same_as(&service)) {
            services.push(service);
        }
    }

    /// First service of the given type.
    #[must_use]
    pub fn get_service(&self, service_type: ServiceType) -> Option<Service> {
        lock(&self.inner.services)
            .iter()
            .find(|s| s.service_type() == service_type)
            .cloned()
    }

    #[must_use]
    pub fn services(&self) -> Vec<Service> {
        lock(&self.inner.services).clone()
    }
}

impl PartialEq for PlatformAccessory {
    fn eq(&self, other: &Self) -> bool {
        self.uuid() == other.uuid()
    }
}

impl Eq for PlatformAccessory {}

impl fmt::Debug for PlatformAccessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformAccessory")
            .field("uuid", &self.uuid())
            .field("display_name", &self.display_name())
            .field("services", &self.services())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_find_added_service_by_type() {
        let accessory =
            PlatformAccessory::new("Kitchen", AccessoryUuid::generate("Kitchen")).unwrap();
        let light = Service::new(ServiceType::Lightbulb, "Kitchen").unwrap();
        accessory.add_service(light.clone());

        let found = accessory.get_service(ServiceType::Lightbulb).unwrap();
        assert!(found.same_as(&light));
        assert!(accessory.get_service(ServiceType::Speaker).is_none());
    }

    #[test]
    fn should_not_add_same_service_twice() {
        let accessory =
            PlatformAccessory::new("Kitchen", AccessoryUuid::generate("Kitchen")).unwrap();
        let light = Service::new(ServiceType::Lightbulb, "Kitchen").unwrap();
        accessory.add_service(light.clone());
        accessory.add_service(light);
        assert_eq!(accessory.services().len(), 1);
    }

    #[test]
    fn should_compare_accessories_by_uuid() {
        let uuid = AccessoryUuid::generate("Kitchen");
        let a = PlatformAccessory::new("Kitchen", uuid).unwrap();
        let b = PlatformAccessory::new("Kitchen (restored)", uuid).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn should_reject_empty_name() {
        let result = PlatformAccessory::new("", AccessoryUuid::generate(""));
        assert_eq!(result.unwrap_err(), ValidationError::EmptyName);
    }
}
