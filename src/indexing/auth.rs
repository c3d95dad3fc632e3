//! Service account authentication for the Indexing API
//!
//! A service account key signs a short-lived JWT assertion which is exchanged
//! at the key's token endpoint for an OAuth bearer token.

use crate::{ApiError, ApiResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::sync::Mutex;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are refreshed
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service account JSON key used for authentication
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Reads a service account key file
    pub fn from_file(path: &Path) -> ApiResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parses a service account key from its JSON form
    pub fn from_json(content: &str) -> ApiResult<Self> {
        let key: Self = serde_json::from_str(content)
            .map_err(|e| ApiError::Credentials(format!("malformed key: {}", e)))?;

        if key.client_email.is_empty() {
            return Err(ApiError::Credentials(
                "client_email cannot be empty".to_string(),
            ));
        }

        Ok(key)
    }
}

/// Source of bearer tokens for API requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> ApiResult<String>;
}

/// A fixed, pre-issued bearer token
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> ApiResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges signed service account assertions for access tokens
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    scope: String,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, scope: impl Into<String>, http: Client) -> Self {
        Self {
            key,
            scope: scope.into(),
            http,
            cached: Mutex::new(None),
        }
    }

    /// Signs an RS256 assertion issued at `now`
    fn sign_assertion(&self, now: DateTime<Utc>) -> ApiResult<String> {
        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| ApiError::Credentials(format!("invalid private key: {}", e)))?;

        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| ApiError::Auth(format!("cannot sign assertion: {}", e)))
    }

    async fn fetch_token(&self) -> ApiResult<CachedToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        tracing::debug!(
            "Requesting access token for {} from {}",
            self.key.client_email,
            self.key.token_uri
        );

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("token response: {}", e)))?;

        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        Ok(CachedToken {
            token: token.access_token,
            expires_at: expiry_after(now, lifetime)?,
        })
    }
}

/// Computes when a token issued at `issued` with `lifetime` seconds expires
fn expiry_after(issued: DateTime<Utc>, lifetime: i64) -> ApiResult<DateTime<Utc>> {
    Duration::try_seconds(lifetime)
        .and_then(|delta| issued.checked_add_signed(delta))
        .ok_or_else(|| {
            ApiError::InvalidResponse(format!("token expires_in {} is out of range", lifetime))
        })
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> ApiResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
