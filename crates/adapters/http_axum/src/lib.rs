//! # rusty-spotify-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small JSON API over a [`RunningBridge`](rusty_spotify_app::bridge::RunningBridge):
//!   list accessories, read and write characteristics
//! - Map HTTP requests onto characteristic reads/writes, which run the
//!   handlers plugins installed (driving adapter)
//! - Map domain errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `rusty-spotify-app` (for the bridge) and `rusty-spotify-domain`
//! (for types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
