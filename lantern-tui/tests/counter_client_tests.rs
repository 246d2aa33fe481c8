//! `CounterClient` against the counter service on a local port.

use std::sync::Arc;
use std::time::Duration;

use lantern_api::{create_router, ApiConfig, AppState};
use lantern_core::{CounterState, CounterStore, LanternError, ValidationError};
use lantern_storage::{FileCounterStore, InMemoryCounterStore};
use lantern_tui::api_client::CounterClient;
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn serve(store: Arc<dyn CounterStore>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(AppState::new(store), &ApiConfig::default());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn round_trip_through_the_service() {
    let base = serve(Arc::new(InMemoryCounterStore::new())).await;
    let client = CounterClient::new(&format!("{base}/"), TIMEOUT).unwrap();

    assert_eq!(client.read_state().await.unwrap(), CounterState::default());
    client.apply_delta(5).await.unwrap();
    client.apply_delta(-2).await.unwrap();
    client.set_step(4).await.unwrap();

    assert_eq!(
        client.read_state().await.unwrap(),
        CounterState { count: 3, step: 4 }
    );
}

#[tokio::test]
async fn validation_errors_come_back_as_validation() {
    let base = serve(Arc::new(InMemoryCounterStore::with_state(CounterState {
        count: i64::MAX,
        step: 1,
    })))
    .await;
    let client = CounterClient::new(&base, TIMEOUT).unwrap();

    let err = client.set_step(0).await.unwrap_err();
    assert!(matches!(
        err,
        LanternError::Validation(ValidationError::InvalidValue { .. })
    ));
    assert!(client.apply_delta(1).await.is_err());
    assert_eq!(client.read_state().await.unwrap().count, i64::MAX);
}

#[tokio::test]
async fn file_store_behind_the_service_persists() {
    let dir = tempfile::tempdir().unwrap();
    let base = serve(Arc::new(FileCounterStore::new(dir.path()))).await;
    let client = CounterClient::new(&base, TIMEOUT).unwrap();
    client.apply_delta(9).await.unwrap();

    let reopened = FileCounterStore::new(dir.path());
    assert_eq!(reopened.read_state().await.unwrap().count, 9);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CounterClient::new(&format!("http://{addr}"), TIMEOUT).unwrap();
    let err = client.read_state().await.unwrap_err();
    assert!(matches!(err, LanternError::Transport(_)));
}
