//! Indexing API access
//!
//! This module contains everything needed to notify the search engine about
//! updated URLs:
//! - Service account authentication
//! - The publish request and response wire types
//! - A batch-oriented API trait and its reqwest implementation

mod auth;
mod client;
mod types;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, StaticToken, TokenProvider};
pub use client::{build_http_client, IndexingClient};
pub use types::{
    PublishRequest, PublishResponse, UrlNotification, UrlNotificationMetadata, URL_UPDATED,
};

use crate::ApiResult;
use async_trait::async_trait;

/// Result of one notification inside a batch
#[derive(Debug)]
pub struct BatchOutcome {
    /// Position-based identifier, starting at "1"
    pub request_id: String,
    pub result: ApiResult<PublishResponse>,
}

/// A service that accepts batches of URL notifications
///
/// Every submitted request yields exactly one `BatchOutcome`; callers must not
/// rely on their order. An `Err` means the batch as a whole could not be sent
/// (for example, no access token could be obtained) and no request went out.
#[async_trait]
pub trait IndexingApi: Send + Sync {
    async fn publish_batch(&self, requests: Vec<PublishRequest>) -> ApiResult<Vec<BatchOutcome>>;
}
