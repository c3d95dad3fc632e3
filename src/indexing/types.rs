//! Wire types for the Indexing API `urlNotifications:publish` call

use serde::{Deserialize, Serialize};

/// Notification type announcing new or changed content
pub const URL_UPDATED: &str = "URL_UPDATED";

/// Body of a publish request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishRequest {
    pub url: String,
    #[serde(rename = "type")]
    pub notification_type: &'static str,
}

impl PublishRequest {
    /// Builds a `URL_UPDATED` notification for `url`
    pub fn url_updated(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            notification_type: URL_UPDATED,
        }
    }
}

/// Successful publish response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub url_notification_metadata: UrlNotificationMetadata,
}

impl PublishResponse {
    /// The URL the API acknowledged
    pub fn notified_url(&self) -> &str {
        &self.url_notification_metadata.url
    }
}

/// Summary of the notifications the API holds for a URL
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotificationMetadata {
    pub url: String,
    #[serde(default)]
    pub latest_update: Option<UrlNotification>,
    #[serde(default)]
    pub latest_remove: Option<UrlNotification>,
}

/// A single notification as echoed back by the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotification {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub notify_time: Option<String>,
}

/// Error envelope returned by Google APIs on failure
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorDetail {
    pub(crate) fn describe(&self) -> String {
        match &self.status {
            Some(status) => format!("{} ({})", self.message, status),
            None => self.message.clone(),
        }
    }
}
