//! Service — a capability object bundling the characteristics of one
//! controllable aspect (Switch, Lightbulb, Speaker).
//!
//! Each service type has a default characteristic set created with the
//! service, and a set of optional characteristics that must be attached
//! explicitly. A characteristic that was never attached cannot be looked up.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::characteristic::{Characteristic, CharacteristicType, lock};
use crate::error::{NotFoundError, ValidationError};

/// HomeKit-style service types used to represent playback control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Switch,
    Lightbulb,
    Speaker,
}

impl ServiceType {
    /// The host-facing name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "Switch",
            Self::Lightbulb => "Lightbulb",
            Self::Speaker => "Speaker",
        }
    }

    /// Characteristics every instance carries from construction.
    #[must_use]
    pub fn default_characteristics(self) -> &'static [CharacteristicType] {
        match self {
            Self::Switch | Self::Lightbulb => &[CharacteristicType::On, CharacteristicType::Name],
            Self::Speaker => &[CharacteristicType::Mute, CharacteristicType::Name],
        }
    }

    /// Characteristics that may be attached after construction.
    #[must_use]
    pub fn optional_characteristics(self) -> &'static [CharacteristicType] {
        match self {
            Self::Switch => &[],
            Self::Lightbulb => &[CharacteristicType::Brightness],
            Self::Speaker => &[CharacteristicType::Volume],
        }
    }

    /// Whether `characteristic` can ever live on this service type.
    #[must_use]
    pub fn permits(self, characteristic: CharacteristicType) -> bool {
        self.default_characteristics().contains(&characteristic)
            || self.optional_characteristics().contains(&characteristic)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "switch" => Ok(Self::Switch),
            "lightbulb" => Ok(Self::Lightbulb),
            "speaker" => Ok(Self::Speaker),
            _ => Err(NotFoundError {
                entity: "Service type",
                id: s.to_string(),
            }),
        }
    }
}

struct Inner {
    service_type: ServiceType,
    display_name: String,
    characteristics: Mutex<Vec<Characteristic>>,
}

/// Shared handle to a capability object.
///
/// Clones refer to the same object; use [`same_as`](Self::same_as) to compare
/// identity.
#[derive(Clone)]
pub struct Service {
    inner: Arc<Inner>,
}

impl Service {
    /// Construct a service with its default characteristics. `Name` is
    /// initialised to `display_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `display_name` is blank.
    pub fn new(service_type: ServiceType, display_name: &str) -> Result<Self, ValidationError> {
        if display_name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let characteristics = service_type
            .default_characteristics()
            .iter()
            .map(|ty| Characteristic::new(*ty))
            .collect::<Vec<_>>();

        let service = Self {
            inner: Arc::new(Inner {
                service_type,
                display_name: display_name.to_string(),
                characteristics: Mutex::new(characteristics),
            }),
        };

        if let Some(name) = service.get_characteristic(CharacteristicType::Name) {
            name.set_value(display_name)?;
        }

        Ok(service)
    }

    #[must_use]
    pub fn service_type(&self) -> ServiceType {
        self.inner.service_type
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.inner.display_name
    }

    /// Snapshot of the attached characteristics, in attachment order.
    #[must_use]
    pub fn characteristics(&self) -> Vec<Characteristic> {
        lock(&self.inner.characteristics).clone()
    }

    #[must_use]
    pub fn has_characteristic(&self, characteristic: CharacteristicType) -> bool {
        self.get_characteristic(characteristic).is_some()
    }

    /// Look up an attached characteristic.
    #[must_use]
    pub fn get_characteristic(&self, characteristic: CharacteristicType) -> Option<Characteristic> {
        lock(&self.inner.characteristics)
            .iter()
            .find(|c| c.characteristic_type() == characteristic)
            .cloned()
    }

    /// Like [`get_characteristic`](Self::get_characteristic) but reports a
    /// missing characteristic as an error.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the characteristic is not attached.
    pub fn characteristic(
        &self,
        characteristic: CharacteristicType,
    ) -> Result<Characteristic, NotFoundError> {
        self.get_characteristic(characteristic)
            .ok_or_else(|| NotFoundError {
                entity: "Characteristic",
                id: format!("{}.{characteristic}", self.service_type()),
            })
    }

    /// Attach an optional characteristic. Attaching one that is already
    /// present returns the existing handle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedCharacteristic`] if the service
    /// type does not permit it.
    pub fn add_characteristic(
        &self,
        characteristic: CharacteristicType,
    ) -> Result<Characteristic, ValidationError> {
        if !self.service_type().permits(characteristic) {
            return Err(ValidationError::UnsupportedCharacteristic {
                service: self.service_type(),
                characteristic,
            });
        }

        let mut characteristics = lock(&self.inner.characteristics);
        if let Some(existing) = characteristics
            .iter()
            .find(|c| c.characteristic_type() == characteristic)
        {
            return Ok(existing.clone());
        }

        let added = Characteristic::new(characteristic);
        characteristics.push(added.clone());
        Ok(added)
    }

    /// The characteristic carrying the volume, if any (`Brightness` on a
    /// light, `Volume` on a speaker).
    #[must_use]
    pub fn volume_characteristic(&self) -> Option<Characteristic> {
        self.get_characteristic(CharacteristicType::Volume)
            .or_else(|| self.get_characteristic(CharacteristicType::Brightness))
    }

    /// Whether both handles refer to the same capability object.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("type", &self.service_type())
            .field("display_name", &self.display_name())
            .field("characteristics", &self.characteristics())
            .finish()
    }
}
