//! HTTP listener
//!
//! Serves `GET /ads` until the shutdown token is cancelled.

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::service::AdsService;

pub fn build_router(service: Arc<AdsService>) -> Router {
    Router::new()
        .route("/ads", get(ads_count))
        .with_state(service)
}

async fn ads_count(State(service): State<Arc<AdsService>>) -> String {
    format!("Current ads count: {}", service.get())
}

/// Bound HTTP listener
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    /// Bind the listener; a bind failure is fatal to startup
    pub async fn bind(addr: SocketAddr, service: Arc<AdsService>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;

        Ok(Self {
            listener,
            router: build_router(service),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.local_addr()?;
        info!(%addr, "HTTP server listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .context("HTTP server error")?;

        info!(%addr, "HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::CounterMetrics;
    use crate::state::StateStore;

    #[tokio::test]
    async fn test_ads_count_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service_state.json");
        std::fs::write(&path, r#"{"adsCount":6}"#).unwrap();
        let service = AdsService::restore(StateStore::new(&path, 10), CounterMetrics::noop());

        let body = ads_count(State(service.clone())).await;
        assert_eq!(body, "Current ads count: 6");

        service.set(0);
        let body = ads_count(State(service)).await;
        assert_eq!(body, "Current ads count: 0");
    }
}
