//! # CTF Toolkit API Server
//!
//! HTTP API for the CTF Toolkit: user registration and login, plus one
//! endpoint per external tool script.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Authentication (Argon2id password hashes, HS256 JWTs)
//! - Tool endpoints that dispatch to external scripts and return their JSON
//! - MongoDB persistence for users and tool logs
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p ctftoolkit-api
//! ```

use anyhow::Context;
use ctftoolkit_api::{
    app::{build_router, AppState},
    config::Config,
};
use ctftoolkit_shared::{
    db::mongo::{MongoConfig, MongoStore},
    tools::ScriptDispatcher,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctftoolkit_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "CTF Toolkit API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    tokio::fs::create_dir_all(&config.tools.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.tools.upload_dir.display()
            )
        })?;

    let store = MongoStore::connect(MongoConfig {
        uri: config.database.uri.clone(),
        database: config.database.name.clone(),
        ..Default::default()
    })
    .await
    .context("Failed to connect to MongoDB")?;

    let runner = ScriptDispatcher::new(&config.tools.python_bin, &config.tools.scripts_dir)
        .with_timeout(config.tools.timeout());

    tracing::info!(
        interpreter = %runner.interpreter(),
        scripts_dir = %runner.scripts_dir().display(),
        timeout_secs = ?config.tools.timeout_secs,
        "Tool dispatcher ready"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(store), Arc::new(runner), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
