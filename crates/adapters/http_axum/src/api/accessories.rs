//! JSON REST handlers for accessories and their characteristics.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use rusty_spotify_domain::accessory::PlatformAccessory;
use rusty_spotify_domain::characteristic::{
    Characteristic, CharacteristicType, CharacteristicValue,
};
use rusty_spotify_domain::error::{BridgeError, NotFoundError};
use rusty_spotify_domain::id::AccessoryUuid;
use rusty_spotify_domain::service::{Service, ServiceType};

use crate::error::ApiError;
use crate::state::AppState;

/// A characteristic and its last known value.
#[derive(Debug, Serialize)]
pub struct CharacteristicView {
    #[serde(rename = "type")]
    pub characteristic_type: CharacteristicType,
    pub format: String,
    pub value: CharacteristicValue,
}

impl From<&Characteristic> for CharacteristicView {
    fn from(characteristic: &Characteristic) -> Self {
        let characteristic_type = characteristic.characteristic_type();
        Self {
            characteristic_type,
            format: characteristic_type.format().to_string(),
            value: characteristic.value(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceView {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub display_name: String,
    pub characteristics: Vec<CharacteristicView>,
}

impl From<&Service> for ServiceView {
    fn from(service: &Service) -> Self {
        Self {
            service_type: service.service_type(),
            display_name: service.display_name().to_string(),
            characteristics: service
                .characteristics()
                .iter()
                .map(CharacteristicView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessoryView {
    pub uuid: String,
    pub display_name: String,
    pub services: Vec<ServiceView>,
}

impl From<&PlatformAccessory> for AccessoryView {
    fn from(accessory: &PlatformAccessory) -> Self {
        Self {
            uuid: accessory.uuid().to_string(),
            display_name: accessory.display_name().to_string(),
            services: accessory.services().iter().map(ServiceView::from).collect(),
        }
    }
}

/// Request body for writing a characteristic.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub value: CharacteristicValue,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AccessoryView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the read and write endpoints.
pub enum CharacteristicResponse {
    Ok(Json<CharacteristicView>),
}

impl IntoResponse for CharacteristicResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn lookup(
    state: &AppState,
    (uuid, service, characteristic): (String, String, String),
) -> Result<Characteristic, BridgeError> {
    let uuid = AccessoryUuid::from_str(&uuid).map_err(|_| NotFoundError {
        entity: "accessory",
        id: uuid.clone(),
    })?;
    let service_type = ServiceType::from_str(&service)?;
    let characteristic_type = CharacteristicType::from_str(&characteristic)?;
    state
        .bridge
        .find_characteristic(uuid, service_type, characteristic_type)
}

/// `GET /api/accessories`
pub async fn list(State(state): State<AppState>) -> Result<ListResponse, ApiError> {
    let accessories = state
        .bridge
        .accessories()
        .iter()
        .map(AccessoryView::from)
        .collect();
    Ok(ListResponse::Ok(Json(accessories)))
}

/// `GET /api/accessories/{uuid}/{service}/{characteristic}`
///
/// Runs the characteristic's get handler.
pub async fn read(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
) -> Result<CharacteristicResponse, ApiError> {
    let characteristic = lookup(&state, path)?;
    characteristic.read().await?;
    Ok(CharacteristicResponse::Ok(Json(CharacteristicView::from(
        &characteristic,
    ))))
}

/// `PUT /api/accessories/{uuid}/{service}/{characteristic}`
///
/// Runs the characteristic's set handler.
pub async fn write(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
    Json(request): Json<WriteRequest>,
) -> Result<CharacteristicResponse, ApiError> {
    let characteristic = lookup(&state, path)?;
    tracing::info!(
        characteristic = %characteristic.characteristic_type(),
        value = ?request.value,
        "writing characteristic"
    );
    characteristic.write(request.value).await?;
    Ok(CharacteristicResponse::Ok(Json(CharacteristicView::from(
        &characteristic,
    ))))
}
