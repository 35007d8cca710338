//! lintel-server entry point.

use std::path::Path;

use lintel_core::config::LintelConfig;
use lintel_server::{router, telemetry, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let config = LintelConfig::load(Path::new("."))?;
    let bind_addr = config.server.bind_addr().to_string();

    // Dependency failures surface here, at startup, not masked later.
    let state = AppState::from_config(config)?;
    tracing::info!(
        bind_addr = %bind_addr,
        database = %state.database_path(),
        "lintel-server starting"
    );

    // Startup housekeeping: purge old resolved issues, lapsed
    // exceptions, and stale matrix rows. Cycles and scorecards are
    // retained indefinitely.
    let policy = lintel_storage::retention::RetentionPolicy::from(&state.config.retention);
    let report = state
        .db
        .with_writer(|conn| lintel_storage::retention::apply_retention(conn, &policy))?;
    if report.total_deleted > 0 {
        tracing::info!(
            deleted = report.total_deleted,
            duration_ms = report.duration_ms,
            "retention cleanup applied"
        );
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("lintel-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
