//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use rusty_spotify_domain::error::BridgeError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`BridgeError`] to an HTTP response with appropriate status code.
pub struct ApiError(BridgeError);

impl<E> From<E> for ApiError
where
    E: Into<BridgeError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BridgeError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BridgeError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            BridgeError::HostApi(err) => {
                tracing::error!(error = %err, "host API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            BridgeError::Plugin(err) => {
                tracing::error!(error = %err, "plugin error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
