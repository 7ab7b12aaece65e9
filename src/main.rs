mod actor_framework;
mod actors;
mod app_system;
mod clients;
mod dashboard;
mod domain;
mod http;
mod mailer;
mod messages;

mod cart_actor;
mod order_actor;
mod product_actor;
mod promo_actor;
mod review_actor;
mod user_actor;
mod vendor_actor;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app_system::{setup_tracing, Config, StoreSystem, SystemError};
use crate::http::{router, AppState};
use crate::mailer::LogMailer;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::load()?;
    info!(port = config.port, "Starting florist store");

    let system = StoreSystem::new(&config, Arc::new(LogMailer));
    system.bootstrap_admin(&config).await?;

    let app = router(AppState::new(&system, &config), &config.cors_origin);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| SystemError::Bind { addr: addr.clone(), source })?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(SystemError::Serve)?;

    // The router and its client handles are gone; stop the actors.
    system.shutdown(SHUTDOWN_TIMEOUT).await?;
    info!("Application stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
