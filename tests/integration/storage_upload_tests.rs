//! Integration tests for the bin-storage client against a local stub.

use axum::http::StatusCode;

use survey_bot::models::survey::{Answer, SurveyRecord, SurveyResponses};
use survey_bot::storage::BinStorage;
use survey_bot::AppError;

use super::test_helpers::{spawn_storage_stub, test_config};

fn record() -> SurveyRecord {
    let mut responses = SurveyResponses::new();
    responses.insert("topics", Answer::Text(Some("Rust".into())));
    SurveyRecord::new("U1", responses, Vec::new())
}

#[tokio::test]
async fn upload_sends_key_and_collection_and_returns_bin_id() {
    let (url, captured, ct) = spawn_storage_stub(StatusCode::OK).await;
    let storage = BinStorage::new(&test_config(&url).storage);

    let bin_id = storage.upload(&record()).await.expect("upload succeeds");
    assert_eq!(bin_id, "bin-123");

    let uploads = captured.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    let headers = &uploads[0].headers;
    assert_eq!(headers["x-master-key"], "test-master-key");
    assert_eq!(headers["x-collection-id"], "coll-test");
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(uploads[0].body["data"]["responses"]["topics"], "Rust");

    ct.cancel();
}

#[tokio::test]
async fn created_status_is_success() {
    let (url, _captured, ct) = spawn_storage_stub(StatusCode::CREATED).await;
    let storage = BinStorage::new(&test_config(&url).storage);

    assert_eq!(storage.upload(&record()).await.expect("upload"), "bin-123");
    ct.cancel();
}

#[tokio::test]
async fn collection_header_omitted_when_unset() {
    let (url, captured, ct) = spawn_storage_stub(StatusCode::OK).await;
    let mut config = test_config(&url);
    config.storage.collection_id = None;
    let storage = BinStorage::new(&config.storage);

    storage.upload(&record()).await.expect("upload succeeds");
    let uploads = captured.lock().unwrap().clone();
    assert!(uploads[0].headers.get("x-collection-id").is_none());

    ct.cancel();
}

#[tokio::test]
async fn rejected_upload_is_storage_error_with_status() {
    let (url, _captured, ct) = spawn_storage_stub(StatusCode::UNAUTHORIZED).await;
    let storage = BinStorage::new(&test_config(&url).storage);

    match storage.upload(&record()).await {
        Err(AppError::Storage(msg)) => {
            assert!(msg.contains("401"), "got: {msg}");
            assert!(msg.contains("Invalid X-Master-Key"), "got: {msg}");
        }
        other => panic!("expected storage error, got {other:?}"),
    }

    ct.cancel();
}

#[tokio::test]
async fn unreachable_service_is_storage_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let storage = BinStorage::new(&test_config(&format!("http://{addr}/v3")).storage);
    let result = storage.upload(&record()).await;
    assert!(matches!(result, Err(AppError::Storage(_))));
}

#[test]
fn endpoint_ignores_trailing_slash() {
    let storage = BinStorage::new(&test_config("https://api.jsonbin.io/v3/").storage);
    assert_eq!(storage.endpoint(), "https://api.jsonbin.io/v3/b");
}
