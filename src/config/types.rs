use serde::Deserialize;

/// Default service account key file
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Publish endpoint of the Indexing API v3
pub const DEFAULT_ENDPOINT: &str = "https://indexing.googleapis.com/v3/urlNotifications:publish";

/// OAuth scope required by the Indexing API
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/indexing";

/// Default daily submission ceiling
pub const DEFAULT_DAILY_LIMIT: u32 = 200;

/// Default number of URLs loaded per batch
pub const DEFAULT_BATCH_SIZE: u32 = 200;

/// Default age after which an index check is considered stale
pub const DEFAULT_RECHECK_AFTER_DAYS: i64 = 7;

/// Default SQLite database location
pub const DEFAULT_DATABASE_PATH: &str = "database.db";

/// Main configuration structure for Bulk Indexer
///
/// Every section is optional; a missing section falls back to the built-in
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Indexing API access configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Path to the service account JSON key
    #[serde(rename = "credentials-path")]
    pub credentials_path: String,

    /// URL notification publish endpoint
    pub endpoint: String,

    /// OAuth scope requested for the access token
    pub scope: String,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            credentials_path: DEFAULT_CREDENTIALS_PATH.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

/// Quota and batching configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Maximum submissions per calendar day
    #[serde(rename = "daily-limit")]
    pub daily_limit: u32,

    /// Maximum number of URLs loaded for one batch
    #[serde(rename = "batch-size")]
    pub batch_size: u32,

    /// Days after which an index check is stale
    #[serde(rename = "recheck-after-days")]
    pub recheck_after_days: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            batch_size: DEFAULT_BATCH_SIZE,
            recheck_after_days: DEFAULT_RECHECK_AFTER_DAYS,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}
