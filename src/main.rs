//! Topic Hub server binary.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use topic_hub::adapters::auth::{AllowAllGatekeeper, StaticTokenGatekeeper};
use topic_hub::adapters::http::app_router;
use topic_hub::application::hub::spawn_hub;
use topic_hub::config::{AppConfig, LogFormat, ServerConfig};
use topic_hub::ports::ConnectionGatekeeper;

const HUB_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let addr = config.server.socket_addr()?;

    let (hub, hub_task) = spawn_hub(config.hub.mailbox_capacity);

    let gatekeeper: Arc<dyn ConnectionGatekeeper> = match &config.auth.ws_token {
        Some(token) => {
            tracing::info!("Websocket connections require a bearer token");
            Arc::new(StaticTokenGatekeeper::new(token.clone()))
        }
        None => Arc::new(AllowAllGatekeeper),
    };

    let app = app_router(hub, gatekeeper, &config.server);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %addr,
        environment = ?config.server.environment,
        replica_id = config.server.replica_id.as_deref().unwrap_or("-"),
        "Topic hub listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Upgraded websockets are not tracked by graceful shutdown and their
    // readers still hold hub handles, so the wait is bounded.
    match tokio::time::timeout(HUB_DRAIN_TIMEOUT, hub_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Hub loop terminated abnormally"),
        Err(_) => tracing::warn!("Hub loop still busy after shutdown, exiting anyway"),
    }

    tracing::info!("Topic hub stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match server.effective_log_format() {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received, draining connections");
}
