//! Integration tests for the submission workflow
//!
//! These tests use wiremock to stand in for the Indexing API and run the
//! full load → submit → bookkeeping cycle against an on-disk database.

use bulk_indexer::indexing::{IndexingApi, IndexingClient, PublishRequest, StaticToken};
use bulk_indexer::loader::load_urls_from_file;
use bulk_indexer::quota::today;
use bulk_indexer::storage::{LogType, SqliteStorage, Storage};
use bulk_indexer::{ApiError, BatchSubmitter, QuotaTracker};
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUBLISH_PATH: &str = "/v3/urlNotifications:publish";
const TOKEN: &str = "test-token";

fn publish_endpoint(server: &MockServer) -> String {
    format!("{}{}", server.uri(), PUBLISH_PATH)
}

fn client_for(server: &MockServer) -> IndexingClient {
    IndexingClient::new(
        publish_endpoint(server),
        Box::new(StaticToken(TOKEN.to_string())),
    )
    .expect("Failed to build client")
}

fn accepted(url: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "urlNotificationMetadata": {
            "url": url,
            "latestUpdate": {
                "url": url,
                "type": "URL_UPDATED",
                "notifyTime": "2024-05-01T10:00:00.000Z"
            }
        }
    }))
}

async fn mount_accepting(server: &MockServer, url: &str) {
    Mock::given(method("POST"))
        .and(path(PUBLISH_PATH))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_partial_json(json!({"url": url, "type": "URL_UPDATED"})))
        .respond_with(accepted(url))
        .expect(1)
        .mount(server)
        .await;
}

fn open_temp_storage(dir: &tempfile::TempDir) -> SqliteStorage {
    SqliteStorage::new(&dir.path().join("index.db")).expect("Failed to open DB")
}

fn urls(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_client_publishes_with_bearer_token() {
    let mock_server = MockServer::start().await;
    mount_accepting(&mock_server, "https://example.com/page").await;

    let client = client_for(&mock_server);
    let outcomes = client
        .publish_batch(vec![PublishRequest::url_updated("https://example.com/page")])
        .await
        .expect("Batch failed");

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].request_id, "1");
    let response = outcomes[0].result.as_ref().expect("Publish failed");
    assert_eq!(response.notified_url(), "https://example.com/page");
}

#[tokio::test]
async fn test_client_reports_api_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PUBLISH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Permission denied. Failed to verify the URL ownership.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcomes = client
        .publish_batch(vec![PublishRequest::url_updated("https://example.com/")])
        .await
        .expect("Batch failed");

    match &outcomes[0].result {
        Err(ApiError::Http {
            url,
            status,
            message,
        }) => {
            assert_eq!(url, "https://example.com/");
            assert_eq!(*status, 403);
            assert!(message.contains("PERMISSION_DENIED"));
        }
        other => panic!("Expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_rejects_malformed_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PUBLISH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let outcomes = client
        .publish_batch(vec![PublishRequest::url_updated("https://example.com/")])
        .await
        .expect("Batch failed");

    assert!(matches!(
        outcomes[0].result,
        Err(ApiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_batch_with_one_failure_keeps_going() {
    let mock_server = MockServer::start().await;

    mount_accepting(&mock_server, "https://one.com/").await;
    mount_accepting(&mock_server, "https://three.com/").await;
    Mock::given(method("POST"))
        .and(path(PUBLISH_PATH))
        .and(body_partial_json(json!({"url": "https://two.com/"})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut storage = open_temp_storage(&dir);
    storage
        .add_urls(&urls(&["https://one.com/", "https://two.com/", "https://three.com/"]))
        .unwrap();

    let client = client_for(&mock_server);
    let report = BatchSubmitter::new(&mut storage, &client, QuotaTracker::new(200), 200)
        .submit_batch()
        .await
        .expect("Submission failed");

    assert_eq!(report.queued, 3);
    assert_eq!(report.submitted, 2);
    assert_eq!(report.failed, 1);

    // Exactly one quota increment per attempt
    assert_eq!(storage.get_or_create_quota(&today()).unwrap().count, 3);
    assert_eq!(storage.count_logs_by_type(LogType::Submitted).unwrap(), 2);
    assert_eq!(storage.count_logs_by_type(LogType::Error).unwrap(), 1);

    for (url, submitted) in [
        ("https://one.com/", true),
        ("https://two.com/", false),
        ("https://three.com/", true),
    ] {
        let record = storage.get_url(url).unwrap().expect("URL missing");
        assert_eq!(
            record.last_submitted.is_some(),
            submitted,
            "Unexpected last_submitted for {}",
            url
        );
    }
}

#[tokio::test]
async fn test_exhausted_quota_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(accepted("https://a.com/"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut storage = open_temp_storage(&dir);
    storage.add_urls(&urls(&["https://a.com/"])).unwrap();
    for _ in 0..200 {
        storage.increment_quota(&today()).unwrap();
    }

    let client = client_for(&mock_server);
    let report = BatchSubmitter::new(&mut storage, &client, QuotaTracker::new(200), 200)
        .submit_batch()
        .await
        .expect("Submission failed");

    assert!(report.quota_exhausted);
    assert_eq!(report.queued, 0);
    assert_eq!(storage.get_or_create_quota(&today()).unwrap().count, 200);
}

#[tokio::test]
async fn test_quota_grows_by_attempts_across_runs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PUBLISH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut storage = open_temp_storage(&dir);
    storage
        .add_urls(&urls(&["https://a.com/", "https://b.com/"]))
        .unwrap();

    let client = client_for(&mock_server);
    for _ in 0..3 {
        BatchSubmitter::new(&mut storage, &client, QuotaTracker::new(200), 200)
            .submit_batch()
            .await
            .expect("Submission failed");
    }

    assert_eq!(storage.get_or_create_quota(&today()).unwrap().count, 6);
    assert_eq!(storage.count_logs_by_type(LogType::Error).unwrap(), 6);
}

#[tokio::test]
async fn test_load_then_submit_from_seed_file() {
    let mock_server = MockServer::start().await;
    mount_accepting(&mock_server, "https://a.com/").await;
    mount_accepting(&mock_server, "https://b.com/").await;

    let dir = tempfile::tempdir().unwrap();
    let seed_path = dir.path().join("urls.txt");
    let mut seed = std::fs::File::create(&seed_path).unwrap();
    writeln!(seed, "https://a.com/\nhttps://b.com/\nhttps://a.com/").unwrap();
    drop(seed);

    let mut storage = open_temp_storage(&dir);
    let load = load_urls_from_file(&mut storage, &seed_path).expect("Load failed");
    assert_eq!(load.added, 2);
    assert_eq!(std::fs::read_to_string(&seed_path).unwrap(), "");

    let client = client_for(&mock_server);
    let report = BatchSubmitter::new(&mut storage, &client, QuotaTracker::new(200), 200)
        .submit_batch()
        .await
        .expect("Submission failed");

    assert_eq!(report.submitted, 2);
    assert_eq!(storage.count_submitted_urls().unwrap(), 2);
}

#[test]
fn test_add_is_idempotent_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut storage = open_temp_storage(&dir);
        storage.add_urls(&urls(&["https://a.com/"])).unwrap();
    }

    let mut storage = open_temp_storage(&dir);
    for _ in 0..3 {
        assert_eq!(storage.add_urls(&urls(&["https://a.com/"])).unwrap(), 0);
    }
    assert_eq!(storage.count_urls().unwrap(), 1);
}

#[test]
fn test_removed_url_never_loaded_again() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = open_temp_storage(&dir);
    storage
        .add_urls(&urls(&["x.com", "y.com"]))
        .unwrap();

    storage.remove_url("x.com").unwrap();
    assert!(storage
        .load_urls(200)
        .unwrap()
        .iter()
        .all(|record| record.url != "x.com"));

    // Removing again is not an error
    assert_eq!(storage.remove_url("x.com").unwrap(), 0);
}
