//! Scrape endpoint tests
//!
//! The global recorder can be installed once per process, so only one test
//! here starts a working exporter.

use ads_counter::App;
use tokio::sync::oneshot;

use crate::common::{free_port, http_get, test_config};

#[tokio::test]
async fn test_scrape_exposes_ads_gauge() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("service_state.json");
    std::fs::write(&state_path, r#"{"adsCount":4}"#).unwrap();

    let mut config = test_config(&state_path);
    config.metrics.enabled = true;
    config.metrics.bind_addr = format!("127.0.0.1:{}", free_port()).parse().unwrap();

    let app = App::start(&config).await.unwrap();
    app.service().set(7);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let running = tokio::spawn(app.run(async {
        let _ = stop_rx.await;
    }));

    let (status, body) = http_get(config.metrics.bind_addr, "/metrics").await;
    assert!(status.contains("200"), "{status}");
    assert!(body.contains("demo_ads_count 7"), "{body}");

    stop_tx.send(()).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_metrics_bind_failure_is_fatal() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut config = test_config(&dir.path().join("service_state.json"));
    config.metrics.enabled = true;
    config.metrics.bind_addr = occupied.local_addr().unwrap();

    assert!(App::start(&config).await.is_err());
}
