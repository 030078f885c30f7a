//! Characteristic — a single readable/writable property of a service.
//!
//! A [`Characteristic`] is a shared handle: the host and the plugin that
//! wires handlers onto it see the same value. Reads go through the optional
//! *get* handler, writes through the optional *set* handler; both are async
//! because they usually talk to the music service.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, NotFoundError, ValidationError};

/// Boxed future returned by characteristic handlers.
pub type HandlerFuture<T> = Pin<Box<dyn Future<Output = Result<T, BridgeError>> + Send>>;

/// Handler invoked when the host reads a characteristic.
pub type GetHandler = Arc<dyn Fn() -> HandlerFuture<CharacteristicValue> + Send + Sync>;

/// Handler invoked when the host writes a characteristic.
pub type SetHandler = Arc<dyn Fn(CharacteristicValue) -> HandlerFuture<()> + Send + Sync>;

/// The characteristic types this plugin family uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacteristicType {
    On,
    Brightness,
    Volume,
    Mute,
    Name,
}

/// Value format a characteristic accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicFormat {
    Bool,
    /// Integer percentage in `0..=100`.
    Percent,
    String,
}

impl CharacteristicType {
    /// The host-facing name (`"On"`, `"Brightness"`, …).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Brightness => "Brightness",
            Self::Volume => "Volume",
            Self::Mute => "Mute",
            Self::Name => "Name",
        }
    }

    #[must_use]
    pub fn format(self) -> CharacteristicFormat {
        match self {
            Self::On | Self::Mute => CharacteristicFormat::Bool,
            Self::Brightness | Self::Volume => CharacteristicFormat::Percent,
            Self::Name => CharacteristicFormat::String,
        }
    }

    /// Value a freshly attached characteristic starts with.
    #[must_use]
    pub fn default_value(self) -> CharacteristicValue {
        match self.format() {
            CharacteristicFormat::Bool => CharacteristicValue::Bool(false),
            CharacteristicFormat::Percent => CharacteristicValue::Int(100),
            CharacteristicFormat::String => CharacteristicValue::Text(String::new()),
        }
    }
}

impl fmt::Display for CharacteristicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacteristicType {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "brightness" => Ok(Self::Brightness),
            "volume" => Ok(Self::Volume),
            "mute" => Ok(Self::Mute),
            "name" => Ok(Self::Name),
            _ => Err(NotFoundError {
                entity: "Characteristic type",
                id: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CharacteristicFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Percent => f.write_str("percent"),
            Self::String => f.write_str("string"),
        }
    }
}

/// A single typed characteristic value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl CharacteristicValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a percentage, if it is an integer within `0..=100`.
    #[must_use]
    pub fn as_percent(&self) -> Option<u8> {
        match self {
            Self::Int(n) => u8::try_from(*n).ok().filter(|p| *p <= 100),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u8> for CharacteristicValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for CharacteristicValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

struct Inner {
    characteristic_type: CharacteristicType,
    value: Mutex<CharacteristicValue>,
    on_get: Mutex<Option<GetHandler>>,
    on_set: Mutex<Option<SetHandler>>,
}

/// Shared handle to one characteristic attached to a service.
#[derive(Clone)]
pub struct Characteristic {
    inner: Arc<Inner>,
}

impl Characteristic {
    /// Create a characteristic holding its type's default value.
    #[must_use]
    pub fn new(characteristic_type: CharacteristicType) -> Self {
        Self {
            inner: Arc::new(Inner {
                characteristic_type,
                value: Mutex::new(characteristic_type.default_value()),
                on_get: Mutex::new(None),
                on_set: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn characteristic_type(&self) -> CharacteristicType {
        self.inner.characteristic_type
    }

    /// The last known value, without invoking any handler.
    #[must_use]
    pub fn value(&self) -> CharacteristicValue {
        lock(&self.inner.value).clone()
    }

    /// Update the cached value without invoking the set handler.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the value does not fit the format.
    pub fn set_value(&self, value: impl Into<CharacteristicValue>) -> Result<(), ValidationError> {
        let value = value.into();
        self.validate(&value)?;
        *lock(&self.inner.value) = value;
        Ok(())
    }

    /// Check that `value` has this characteristic's format and range.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FormatMismatch`] or
    /// [`ValidationError::OutOfRange`].
    pub fn validate(&self, value: &CharacteristicValue) -> Result<(), ValidationError> {
        let characteristic = self.characteristic_type();
        let expected = characteristic.format();
        match (expected, value) {
            (CharacteristicFormat::Bool, CharacteristicValue::Bool(_))
            | (CharacteristicFormat::String, CharacteristicValue::Text(_)) => Ok(()),
            (CharacteristicFormat::Percent, CharacteristicValue::Int(n)) => {
                if (0..=100).contains(n) {
                    Ok(())
                } else {
                    Err(ValidationError::OutOfRange {
                        characteristic,
                        value: *n,
                    })
                }
            }
            _ => Err(ValidationError::FormatMismatch {
                characteristic,
                expected,
            }),
        }
    }

    /// Install the handler answering host reads. Replaces any previous one.
    pub fn on_get<F, Fut>(&self, handler: F) -> &Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CharacteristicValue, BridgeError>> + Send + 'static,
    {
        let handler: GetHandler = Arc::new(move || Box::pin(handler()));
        *lock(&self.inner.on_get) = Some(handler);
        self
    }

    /// Install the handler applying host writes. Replaces any previous one.
    pub fn on_set<F, Fut>(&self, handler: F) -> &Self
    where
        F: Fn(CharacteristicValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BridgeError>> + Send + 'static,
    {
        let handler: SetHandler = Arc::new(move |value| Box::pin(handler(value)));
        *lock(&self.inner.on_set) = Some(handler);
        self
    }

    #[must_use]
    pub fn has_get_handler(&self) -> bool {
        lock(&self.inner.on_get).is_some()
    }

    #[must_use]
    pub fn has_set_handler(&self) -> bool {
        lock(&self.inner.on_set).is_some()
    }

    /// Read the value the way the host does: through the get handler when
    /// one is installed, caching its answer.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error, or a validation error if the handler
    /// answered with a value of the wrong format.
    pub async fn read(&self) -> Result<CharacteristicValue, BridgeError> {
        let handler = lock(&self.inner.on_get).clone();
        match handler {
            Some(handler) => {
                let value = handler().await?;
                self.set_value(value.clone())?;
                Ok(value)
            }
            None => Ok(self.value()),
        }
    }

    /// Write the value the way the host does: validate, run the set handler
    /// when one is installed, then cache.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed value, or the handler's
    /// error (in which case the cached value is left unchanged).
    pub async fn write(&self, value: CharacteristicValue) -> Result<(), BridgeError> {
        self.validate(&value)?;
        let handler = lock(&self.inner.on_set).clone();
        if let Some(handler) = handler {
            handler(value.clone()).await?;
        }
        *lock(&self.inner.value) = value;
        Ok(())
    }

    /// Whether both handles refer to the same characteristic.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Characteristic")
            .field("type", &self.characteristic_type())
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
