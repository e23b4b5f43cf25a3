//! HTTP surface of the relay: one catch-all handler that turns GET requests into event
//! streams and POST requests into publishes on the channel named by the request path.

use log::*;
use std::future::IntoFuture;
use tokio::net::TcpListener;

pub use error::{Error, Result};
pub use service::AppState;

mod controller;
pub mod error;
mod router;

pub use router::define_routes;

/// Binds the configured address and serves the relay until Ctrl-C or SIGTERM.
///
/// Open event streams are not drained on shutdown; dropping the runtime ends them and
/// their subscriptions release themselves.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = app_state.config.listen_addr();
    info!(
        "Server starting... listening for connections on http://{listen_addr} ({} environment)",
        app_state.config.runtime_env()
    );

    let listener = TcpListener::bind(&listen_addr).await?;
    let router = define_routes(app_state);

    tokio::select! {
        served = axum::serve(listener, router).into_future() => served,
        _ = shutdown_signal() => {
            info!("Shutdown signal received, closing all event streams");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {e}");
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
                error!("Failed to install SIGTERM handler: {e}");
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
}
