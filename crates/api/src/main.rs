use std::net::SocketAddr;
use std::sync::Arc;

use saw_automation::ssm::SsmAutomationEngine;
use saw_automation::troubleshooter::Troubleshooter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saw_api::config::{LogFormat, ServerConfig};
use saw_api::router::build_app_router;
use saw_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "saw_api=debug,saw_automation=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!(
        host = %config.host,
        port = config.port,
        execution_budget_secs = config.execution_budget.as_secs(),
        request_budget_secs = config.request_budget().as_secs(),
        "Loaded server configuration",
    );

    // --- Workflow engine ---
    let engine = SsmAutomationEngine::from_env().await;
    tracing::info!("SSM Automation client created");

    // --- App state ---
    let troubleshooter = Troubleshooter::new(
        Arc::new(engine),
        config.poll.to_poll_config(),
        config.request_budget(),
    );
    let state = AppState {
        troubleshooter: Arc::new(troubleshooter),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). If a handler cannot
/// be installed the server keeps running until the other signal arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
