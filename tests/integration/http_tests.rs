//! HTTP facade tests over a real socket

use std::sync::Arc;

use ads_counter::server::HttpServer;
use ads_counter::service::{AdsService, CounterMetrics};
use ads_counter::state::StateStore;
use tokio_util::sync::CancellationToken;

use crate::common::http_get;

async fn serve(service: Arc<AdsService>) -> (std::net::SocketAddr, CancellationToken) {
    let server = HttpServer::bind("127.0.0.1:0".parse().unwrap(), service)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(server.run(shutdown.clone()));
    (addr, shutdown)
}

#[tokio::test]
async fn test_get_ads_reflects_counter() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("service_state.json"), 10);
    let service = AdsService::restore(store, CounterMetrics::noop());
    let (addr, shutdown) = serve(service.clone()).await;

    let (status, body) = http_get(addr, "/ads").await;
    assert!(status.contains("200"), "{status}");
    assert_eq!(body, format!("Current ads count: {}", service.get()));

    service.set(10);
    let (_, body) = http_get(addr, "/ads").await;
    assert_eq!(body, "Current ads count: 10");

    shutdown.cancel();
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("service_state.json"), 10);
    let (addr, shutdown) = serve(AdsService::restore(store, CounterMetrics::noop())).await;

    let (status, _) = http_get(addr, "/missing").await;
    assert!(status.contains("404"), "{status}");

    shutdown.cancel();
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("service_state.json"), 10);

    let result = HttpServer::bind(
        occupied.local_addr().unwrap(),
        AdsService::restore(store, CounterMetrics::noop()),
    )
    .await;
    assert!(result.is_err());
}
