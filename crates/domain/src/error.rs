//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `#[from]` (no `String` variants at this level).

use crate::characteristic::{CharacteristicFormat, CharacteristicType};
use crate::service::ServiceType;

/// Base error for every operation crossing a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The host does not expose the API surface the plugin was written against.
    #[error("host API mismatch")]
    HostApi(#[from] HostApiError),

    /// A collaborator (music service client, plugin instance) failed.
    #[error("plugin error")]
    Plugin(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{service} does not support characteristic {characteristic}")]
    UnsupportedCharacteristic {
        service: ServiceType,
        characteristic: CharacteristicType,
    },

    #[error("{characteristic} expects a {expected} value")]
    FormatMismatch {
        characteristic: CharacteristicType,
        expected: CharacteristicFormat,
    },

    #[error("{characteristic} value {value} is outside 0..=100")]
    OutOfRange {
        characteristic: CharacteristicType,
        value: i64,
    },

    #[error("invalid plugin configuration: {0}")]
    InvalidConfig(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The host's HAP registry lacks a type the capability needs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HostApiError {
    #[error("host does not provide service type {0}")]
    MissingService(ServiceType),

    #[error("host does not provide characteristic type {0}")]
    MissingCharacteristic(CharacteristicType),
}
