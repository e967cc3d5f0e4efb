use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use backend_starter::api::{RateLimitConfig, create_router_with_rate_limit};
use backend_starter::app::AppState;
use backend_starter::infra::observability::{init_metrics_handle, init_tracing};
use backend_starter::infra::{AppConfig, CloudinaryClient, PostgresClient, set_runtime_env};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Publish the runtime mode before anything can render an error response
    set_runtime_env(config.env);
    init_tracing(config.env);

    // Metrics are best-effort; a missing recorder only disables GET /metrics
    let metrics = init_metrics_handle();

    // Connect to the database before the listener binds; a dead database
    // aborts startup instead of serving errors
    let db_client = Arc::new(
        PostgresClient::with_defaults(&config.database_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    let media_store =
        Arc::new(CloudinaryClient::with_defaults(&config.media).context("Failed to create media host client")?);

    let mut state =
        AppState::new(db_client, media_store).with_tmp_dir(config.tmp_dir.clone());
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }
    let state = Arc::new(state);

    let rate_limit = RateLimitConfig {
        general_rps: config.rate_limit_rps,
        general_burst: config.rate_limit_burst,
        ..Default::default()
    };
    let router = create_router_with_rate_limit(state, rate_limit);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, env = ?config.env, "Server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

/// Resolves when the process receives ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received ctrl-c, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
