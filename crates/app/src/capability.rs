//! Capability construction — templates and factories handed to plugins.
//!
//! [`CapabilityContext`] carries the host's type registry explicitly, so a
//! collaborator never reaches for host types through shared global state.

use std::sync::Arc;

use rusty_spotify_domain::accessory::PlatformAccessory;
use rusty_spotify_domain::error::{BridgeError, HostApiError};
use rusty_spotify_domain::id::AccessoryUuid;
use rusty_spotify_domain::plugin::volume_characteristic_for;
use rusty_spotify_domain::service::{Service, ServiceType};

use crate::ports::host::AccessoryRegistry;
use crate::ports::HapRegistry;

/// Factories for capability objects and accessories, backed by the host.
#[derive(Clone)]
pub struct CapabilityContext {
    hap: Arc<dyn HapRegistry>,
}

impl CapabilityContext {
    #[must_use]
    pub fn new(hap: Arc<dyn HapRegistry>) -> Self {
        Self { hap }
    }

    /// Build a fresh capability of `service_type`, attaching the
    /// characteristic that carries the volume when the type does not have
    /// it natively.
    ///
    /// # Errors
    ///
    /// Returns a [`HostApiError`] if the host lacks the service or the
    /// volume characteristic, or a validation error for a blank name.
    pub fn create(&self, service_type: ServiceType, name: &str) -> Result<Service, BridgeError> {
        let service = self.hap.create_service(service_type, name)?;

        if let Some(characteristic) = volume_characteristic_for(service_type) {
            if !self.hap.supports_characteristic(characteristic) {
                return Err(HostApiError::MissingCharacteristic(characteristic).into());
            }
            service.add_characteristic(characteristic)?;
        }

        Ok(service)
    }

    /// A `Switch` capability.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_switch(&self, name: &str) -> Result<Service, BridgeError> {
        self.create(ServiceType::Switch, name)
    }

    /// A `Lightbulb` capability with `Brightness` attached.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_light(&self, name: &str) -> Result<Service, BridgeError> {
        self.create(ServiceType::Lightbulb, name)
    }

    /// A `Speaker` capability with `Volume` attached.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_speaker(&self, name: &str) -> Result<Service, BridgeError> {
        self.create(ServiceType::Speaker, name)
    }

    #[must_use]
    pub fn generate_uuid(&self, base: &str) -> AccessoryUuid {
        self.hap.generate_uuid(base)
    }

    /// An empty accessory from the host's accessory base.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name.
    pub fn create_accessory(
        &self,
        display_name: &str,
        uuid: AccessoryUuid,
    ) -> Result<PlatformAccessory, BridgeError> {
        self.hap.create_accessory(display_name, uuid)
    }
}

/// Leading arguments bound to a platform constructor.
#[derive(Clone)]
pub struct PlatformBinding {
    /// Handle for publishing accessories to the host.
    pub host: Arc<dyn AccessoryRegistry>,
    /// Capability factories, one object per managed accessory.
    pub capabilities: CapabilityContext,
    /// Capability built at registration time, if one was requested.
    pub default_capability: Option<Service>,
}
