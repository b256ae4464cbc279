// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Site Gate Service
//!
//! Serves the product site's public write endpoints behind the abuse gate:
//!
//! - `POST /api/contact` (3 per hour per client, default)
//! - `POST /api/products/:id/interest` (3 per hour)
//! - `GET|POST /api/blog/:slug/comments` (5 per minute)
//! - `GET|POST /api/blog/:slug/likes` (10 per minute)
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `<ENDPOINT>_MAX_REQUESTS`, `<ENDPOINT>_WINDOW_MS`: per-endpoint policy,
//!   for `CONTACT`, `INTEREST`, `COMMENT` and `LIKE`
//! - `SWEEP_INTERVAL_SECS`: expired-window sweep interval (default: 300)
//! - `RECAPTCHA_SECRET_KEY`: CAPTCHA verification secret
//! - `SEED_PATH`: JSON file with posts and products to serve

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use site_gate::{
    clock::SystemClock,
    config::Config,
    handlers::{router, AppState},
    store::Seed,
    sweeper::Sweeper,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        bind_addr = %config.bind_addr,
        contact = ?config.policies.contact,
        interest = ?config.policies.interest,
        comment = ?config.policies.comment,
        like = ?config.policies.like,
        sweep_interval_secs = config.sweep.interval_secs,
        captcha_configured = config.captcha.secret_key.is_some(),
        "Starting site gate"
    );
    if config.captcha.secret_key.is_none() && config.captcha.skip_when_unconfigured {
        warn!("CAPTCHA verification disabled; do not run this way in production");
    }

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), Arc::new(SystemClock))?);

    if let Some(path) = &config.seed_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {path}"))?;
        let seed = Seed::from_json(&raw).with_context(|| format!("invalid seed file {path}"))?;
        let (posts, products) = state.store.load_seed(seed).await;
        info!(path = %path, posts, products, "Seed loaded");
    }

    // Start sweeper
    let sweeper = Sweeper::start(
        state.limiter.clone(),
        Some(state.metrics.clone()),
        config.sweep.interval(),
    );

    // Build router
    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
