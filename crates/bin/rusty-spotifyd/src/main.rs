//! # rusty-spotifyd — Spotify bridge daemon
//!
//! Composition root that wires the plugin into the in-process host and
//! serves the resulting accessories over HTTP.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Initialise the Spotify plugin once per configured capability kind
//! - Launch the configured accessory and platform blocks
//! - Build the axum router around the running bridge
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT), stopping platform refresh loops
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use rusty_spotify_adapter_http_axum::state::AppState;
use rusty_spotify_adapter_spotify::SpotifyModule;
use rusty_spotify_app::bridge::LocalBridge;
use rusty_spotify_app::registrar::initialize;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Plugin
    let module = Arc::new(SpotifyModule::new().context("building Spotify client")?);
    let mut bridge = LocalBridge::new(config.bridge.version.clone());
    for kind in config.capabilities() {
        initialize(&mut bridge, kind, Arc::clone(&module))
            .with_context(|| format!("initialising {kind} capability"))?;
    }

    // Launch
    let entries = config.plugin_entries()?;
    tracing::info!(
        bridge = %config.bridge.name,
        version = %config.bridge.version,
        entries = entries.len(),
        "launching bridge"
    );
    let running = Arc::new(bridge.launch(entries).context("launching plugin blocks")?);

    // HTTP
    let app = rusty_spotify_adapter_http_axum::router::build(AppState::from_arc(Arc::clone(
        &running,
    )));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "rusty-spotifyd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    running.shutdown();
    tracing::info!("rusty-spotifyd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
