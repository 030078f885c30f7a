//! Shared application state for axum handlers.

use std::sync::Arc;

use rusty_spotify_app::bridge::RunningBridge;

/// Application state shared across all axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The launched bridge whose accessories the API exposes.
    pub bridge: Arc<RunningBridge>,
}

impl AppState {
    #[must_use]
    pub fn new(bridge: RunningBridge) -> Self {
        Self::from_arc(Arc::new(bridge))
    }

    /// Create the state from a bridge already shared with other tasks.
    #[must_use]
    pub fn from_arc(bridge: Arc<RunningBridge>) -> Self {
        Self { bridge }
    }
}
