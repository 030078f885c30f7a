//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod accessories;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accessories", get(accessories::list))
        .route(
            "/accessories/{uuid}/{service}/{characteristic}",
            get(accessories::read).put(accessories::write),
        )
}
