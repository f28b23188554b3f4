use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{config::ServerConfig, errors::Error};

use super::routes::{build_router, ApiState};

pub async fn start_api_server(config: &ServerConfig, state: ApiState) -> crate::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid API address: {}", e)))?;

    let router: Router = build_router(state, config);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "API server shutdown listener failed");
            }
        })
        .await
        .map_err(|e| Error::transport(format!("API server error: {}", e)))?;

    info!("API server shutdown completed");
    Ok(())
}
