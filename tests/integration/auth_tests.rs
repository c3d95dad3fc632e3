//! Integration tests for service account authentication
//!
//! A throwaway RSA key signs real assertions; wiremock stands in for both the
//! OAuth token endpoint and the Indexing API.

use bulk_indexer::indexing::{
    build_http_client, IndexingClient, ServiceAccountAuth, ServiceAccountKey, TokenProvider,
};
use bulk_indexer::quota::today;
use bulk_indexer::storage::{SqliteStorage, Storage};
use bulk_indexer::{ApiError, BatchSubmitter, IndexerError, QuotaTracker};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/test_service_account.pem");
const PUBLIC_KEY_PEM: &str = include_str!("../fixtures/test_service_account.pub.pem");

const CLIENT_EMAIL: &str = "indexer@demo.iam.gserviceaccount.com";
const SCOPE: &str = "https://www.googleapis.com/auth/indexing";
const TOKEN_PATH: &str = "/token";
const PUBLISH_PATH: &str = "/v3/urlNotifications:publish";
const GRANT_TYPE_FORM: &str = "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";

#[derive(Debug, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

fn token_uri(server: &MockServer) -> String {
    format!("{}{}", server.uri(), TOKEN_PATH)
}

fn auth_for(server: &MockServer) -> ServiceAccountAuth {
    let key = ServiceAccountKey {
        client_email: CLIENT_EMAIL.to_string(),
        private_key: PRIVATE_KEY_PEM.to_string(),
        token_uri: token_uri(server),
    };
    ServiceAccountAuth::new(key, SCOPE, build_http_client().expect("http client"))
}

async fn mount_token(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains(GRANT_TYPE_FORM))
        .and(body_string_contains("assertion="))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

fn issued(token: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "expires_in": expires_in,
        "token_type": "Bearer"
    }))
}

#[tokio::test]
async fn test_token_is_fetched_once_and_reused() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, issued("ya29.first", 3600), 1).await;

    let auth = auth_for(&mock_server);

    assert_eq!(auth.access_token().await.unwrap(), "ya29.first");
    assert_eq!(auth.access_token().await.unwrap(), "ya29.first");
}

#[tokio::test]
async fn test_token_near_expiry_is_refreshed() {
    let mock_server = MockServer::start().await;
    // Already inside the refresh margin when issued
    mount_token(&mock_server, issued("ya29.short", 30), 2).await;

    let auth = auth_for(&mock_server);

    assert_eq!(auth.access_token().await.unwrap(), "ya29.short");
    assert_eq!(auth.access_token().await.unwrap(), "ya29.short");
}

#[tokio::test]
async fn test_assertion_is_signed_for_token_endpoint() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, issued("ya29.first", 3600), 1).await;

    let auth = auth_for(&mock_server);
    auth.access_token().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let assertion = url::form_urlencoded::parse(&requests[0].body)
        .find(|(name, _)| name == "assertion")
        .map(|(_, value)| value.into_owned())
        .expect("No assertion in token request");

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_uri(&mock_server)]);
    let decoded = decode::<AssertionClaims>(
        &assertion,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY_PEM.as_bytes()).unwrap(),
        &validation,
    )
    .expect("Assertion did not verify");

    assert_eq!(decoded.claims.iss, CLIENT_EMAIL);
    assert_eq!(decoded.claims.scope, SCOPE);
    assert_eq!(decoded.claims.aud, token_uri(&mock_server));
    assert_eq!(decoded.claims.exp - decoded.claims.iat, 3600);
}

#[tokio::test]
async fn test_rejected_exchange_is_auth_error() {
    let mock_server = MockServer::start().await;
    mount_token(
        &mock_server,
        ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })),
        1,
    )
    .await;

    let auth = auth_for(&mock_server);

    match auth.access_token().await {
        Err(ApiError::Auth(message)) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid_grant"));
        }
        other => panic!("Expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_out_of_range_expiry_is_invalid_response() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, issued("ya29.forever", i64::MAX), 1).await;

    let auth = auth_for(&mock_server);

    assert!(matches!(
        auth.access_token().await,
        Err(ApiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_failed_exchange_consumes_no_quota() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, ResponseTemplate::new(401), 1).await;

    Mock::given(method("POST"))
        .and(path(PUBLISH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut storage = SqliteStorage::new_in_memory().expect("Failed to open DB");
    storage
        .add_urls(&["https://a.com/".to_string(), "https://b.com/".to_string()])
        .unwrap();

    let client = IndexingClient::new(
        format!("{}{}", mock_server.uri(), PUBLISH_PATH),
        Box::new(auth_for(&mock_server)),
    )
    .expect("Failed to build client");

    let result = BatchSubmitter::new(&mut storage, &client, QuotaTracker::new(200), 200)
        .submit_batch()
        .await;

    assert!(matches!(result, Err(IndexerError::Api(ApiError::Auth(_)))));
    assert_eq!(storage.get_or_create_quota(&today()).unwrap().count, 0);
    assert!(storage.load_logs(10).unwrap().is_empty());
    assert!(storage
        .get_url("https://a.com/")
        .unwrap()
        .unwrap()
        .last_submitted
        .is_none());
}
