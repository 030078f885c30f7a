//! Spotify adapter error types.

use rusty_spotify_domain::error::{BridgeError, ValidationError};

/// Errors specific to the Spotify adapter.
#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    /// The HTTP client could not complete the request.
    #[error("request to Spotify failed")]
    Http(#[source] reqwest::Error),

    /// Spotify answered with a non-success status.
    #[error("Spotify answered {status} to {operation}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    /// The accounts service refused to issue an access token.
    #[error("token refresh rejected with status {status}")]
    TokenRequest { status: u16 },

    /// The plugin configuration block is unusable.
    #[error("invalid Spotify configuration: {0}")]
    Config(String),

    /// The rotated refresh token could not be written back.
    #[error("failed to persist refresh token")]
    Io(#[source] std::io::Error),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] BridgeError),
}

impl SpotifyError {
    /// Convert into a [`BridgeError`] for propagation across port boundaries.
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::Domain(err) => err,
            Self::Config(reason) => ValidationError::InvalidConfig(reason).into(),
            other => BridgeError::Plugin(Box::new(other)),
        }
    }
}

impl From<SpotifyError> for BridgeError {
    fn from(err: SpotifyError) -> Self {
        err.into_domain()
    }
}
