mod app;
mod sessions;

use anyhow::Context;
use registration::{Config, HttpRegistrationClient};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::{router, AppState};

const DEFAULT_LOG_FILTER: &str = "registration=info,registration_server=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config_path =
        std::env::var("REGISTRATION_CONFIG").unwrap_or_else(|_| "registration.toml".to_string());
    let config = Config::load(&config_path)
        .unwrap_or_else(|e| {
            warn!("Failed to load config: {:#}, using defaults", e);
            Config::default()
        })
        .apply_overrides(|key| std::env::var(key).ok())?;

    info!(
        endpoint = %config.submission.endpoint,
        on_failure = ?config.submission.on_failure,
        message_source = ?config.submission.error_message_source,
        "registration form starting"
    );

    let client = HttpRegistrationClient::from_config(&config.submission)?;
    let state = AppState::new(Arc::new(client), config.submission.policy());
    state.sessions.clone().spawn_sweeper(config.server.form_idle());
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
