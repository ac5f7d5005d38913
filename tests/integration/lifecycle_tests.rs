//! Startup, restore and shutdown scenarios

use ads_counter::state::{PersistedState, StateStore};
use ads_counter::App;
use tokio::sync::oneshot;

use crate::common::{http_get, test_config};

#[tokio::test]
async fn test_fresh_start_persists_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("service_state.json");
    let config = test_config(&state_path);

    let app = App::start(&config).await.unwrap();
    let addr = app.local_addr().unwrap();
    let initial = app.service().get();
    assert!(initial <= 10);
    assert!(!state_path.exists());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let running = tokio::spawn(app.run(async {
        let _ = stop_rx.await;
    }));

    let (_, body) = http_get(addr, "/ads").await;
    assert_eq!(body, format!("Current ads count: {}", initial));

    stop_tx.send(()).unwrap();
    tokio_test::assert_ok!(running.await.unwrap());

    let persisted = StateStore::new(&state_path, 10).load().unwrap();
    assert_eq!(persisted, PersistedState { ads_count: initial });
}

#[tokio::test]
async fn test_restart_restores_persisted_value() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("service_state.json");
    std::fs::write(&state_path, r#"{"adsCount":9}"#).unwrap();
    let config = test_config(&state_path);

    let app = App::start(&config).await.unwrap();
    let addr = app.local_addr().unwrap();
    assert_eq!(app.service().get(), 9);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let running = tokio::spawn(app.run(async {
        let _ = stop_rx.await;
    }));

    let (_, body) = http_get(addr, "/ads").await;
    assert_eq!(body, "Current ads count: 9");

    stop_tx.send(()).unwrap();
    running.await.unwrap().unwrap();

    let raw = std::fs::read_to_string(&state_path).unwrap();
    assert_eq!(raw, r#"{"adsCount":9}"#);
}

#[tokio::test]
async fn test_corrupt_state_starts_with_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("service_state.json");
    std::fs::write(&state_path, "{ truncated").unwrap();

    let app = App::start(&test_config(&state_path)).await.unwrap();
    assert!(app.service().get() <= 10);
}

#[tokio::test]
async fn test_chaos_disarmed_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir.path().join("service_state.json"));
    config.chaos.enabled = true;
    config.chaos.delay_secs = 3600;

    let app = App::start(&config).await.unwrap();
    app.run(async {}).await.unwrap();
}
