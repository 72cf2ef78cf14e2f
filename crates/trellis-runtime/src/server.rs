//! HTTP serving and shutdown signal handling.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Binds a listener per the server configuration and serves `router` until
/// `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, router: Router, shutdown: F) -> RuntimeResult<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = config
        .address()
        .parse()
        .map_err(|_| RuntimeError::InvalidAddress(config.address()))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RuntimeError::Bind { addr, source })?;

    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(RuntimeError::Serve)
}

/// Waits for a shutdown signal (Ctrl+C, or SIGTERM on Unix).
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let Ok(mut sigterm) = signal::unix::signal(signal::unix::SignalKind::terminate()) else {
            let _ = signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down");
            return;
        };

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down");
    }
}
