//! HTTP client for the Indexing API
//!
//! This module handles all requests to the publish endpoint, including:
//! - Building the HTTP client with the tool's user agent
//! - Attaching bearer tokens from a `TokenProvider`
//! - Classifying non-success responses into `ApiError`s

use crate::config::IndexingConfig;
use crate::indexing::auth::{ServiceAccountAuth, ServiceAccountKey, TokenProvider};
use crate::indexing::types::{ErrorEnvelope, PublishRequest, PublishResponse};
use crate::indexing::{BatchOutcome, IndexingApi};
use crate::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("bulk-indexer/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
}

/// Indexing API client backed by reqwest
pub struct IndexingClient {
    http: Client,
    endpoint: String,
    auth: Box<dyn TokenProvider>,
}

impl IndexingClient {
    /// Creates a client publishing to `endpoint` with tokens from `auth`
    pub fn new(endpoint: impl Into<String>, auth: Box<dyn TokenProvider>) -> ApiResult<Self> {
        Ok(Self {
            http: build_http_client()?,
            endpoint: endpoint.into(),
            auth,
        })
    }

    /// Creates a client authenticated with the configured service account key
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulk_indexer::config::IndexingConfig;
    /// use bulk_indexer::indexing::IndexingClient;
    ///
    /// let client = IndexingClient::from_config(&IndexingConfig::default()).unwrap();
    /// ```
    pub fn from_config(config: &IndexingConfig) -> ApiResult<Self> {
        let key = ServiceAccountKey::from_file(Path::new(&config.credentials_path))?;
        let http = build_http_client()?;
        let auth = ServiceAccountAuth::new(key, config.scope.clone(), http.clone());

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            auth: Box::new(auth),
        })
    }

    /// Publishes a single notification
    pub async fn publish(
        &self,
        token: &str,
        request: &PublishRequest,
    ) -> ApiResult<PublishResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<PublishResponse>()
                .await
                .map_err(|e| ApiError::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => envelope.error.describe(),
            Err(_) if body.is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => body,
        };

        Err(ApiError::Http {
            url: request.url.clone(),
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl IndexingApi for IndexingClient {
    async fn publish_batch(&self, requests: Vec<PublishRequest>) -> ApiResult<Vec<BatchOutcome>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let token = self.auth.access_token().await?;
        tracing::info!("Publishing {} notifications", requests.len());

        let mut outcomes = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let result = self.publish(&token, request).await;
            if let Err(e) = &result {
                tracing::warn!("Publish failed for {}: {}", request.url, e);
            }

            outcomes.push(BatchOutcome {
                request_id: (index + 1).to_string(),
                result,
            });
        }

        Ok(outcomes)
    }
}
