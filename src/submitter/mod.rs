//! Quota-gated batch submission
//!
//! This module contains the submission run that:
//! 1. Loads candidate URLs from storage
//! 2. Queues one `URL_UPDATED` notification per URL while quota remains
//! 3. Sends the queued notifications as one batch
//! 4. Hands every per-item outcome to a `ResultHandler` for bookkeeping

mod check;
mod handler;

pub use check::check_indexing;
pub use handler::{BookkeepingHandler, ResultHandler};

use crate::indexing::{IndexingApi, PublishRequest};
use crate::quota::QuotaTracker;
use crate::storage::Storage;
use crate::IndexerError;

/// Summary of one submission run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// URLs loaded from storage
    pub loaded: usize,
    /// Notifications sent to the API
    pub queued: usize,
    /// Notifications the API accepted
    pub submitted: usize,
    /// Notifications that failed
    pub failed: usize,
    /// Whether queuing stopped because the daily quota was reached
    pub quota_exhausted: bool,
    /// Submissions left today once the queued notifications are counted
    pub quota_remaining: usize,
}

/// Submits stored URLs to the Indexing API within the daily quota
pub struct BatchSubmitter<'a> {
    storage: &'a mut dyn Storage,
    api: &'a dyn IndexingApi,
    quota: QuotaTracker,
    batch_size: usize,
}

impl<'a> BatchSubmitter<'a> {
    /// Creates a submitter
    ///
    /// # Arguments
    ///
    /// * `storage` - The record store
    /// * `api` - The Indexing API to publish to
    /// * `quota` - The daily quota policy
    /// * `batch_size` - Maximum number of URLs loaded per run
    pub fn new(
        storage: &'a mut dyn Storage,
        api: &'a dyn IndexingApi,
        quota: QuotaTracker,
        batch_size: usize,
    ) -> Self {
        Self {
            storage,
            api,
            quota,
            batch_size,
        }
    }

    /// Runs one submission batch
    ///
    /// Today's quota is read once before queuing. Queuing stops as soon as
    /// the queued count reaches the quota remaining for today; when the limit is
    /// already reached nothing is sent. Failed items never abort the batch.
    /// The quota counter itself only advances in the result handler, once
    /// per returned outcome.
    pub async fn submit_batch(&mut self) -> Result<BatchReport, IndexerError> {
        let candidates = self.storage.load_urls(self.batch_size)?;
        let used = self.quota.used(self.storage)?;
        let limit = self.quota.daily_limit();
        let remaining = self.quota.remaining_after(used) as usize;

        let mut report = BatchReport {
            loaded: candidates.len(),
            ..Default::default()
        };

        tracing::info!(
            "Loaded {} URLs, quota used today: {}/{}",
            candidates.len(),
            used,
            limit
        );

        let mut requests = Vec::with_capacity(candidates.len());
        for record in &candidates {
            if requests.len() >= remaining {
                println!("Quota exceeded. Please try again tomorrow.");
                report.quota_exhausted = true;
                break;
            }
            requests.push(PublishRequest::url_updated(record.url.as_str()));
        }

        report.queued = requests.len();
        report.quota_remaining = remaining - requests.len();
        if requests.is_empty() {
            tracing::info!("Nothing to submit");
            return Ok(report);
        }

        let outcomes = self.api.publish_batch(requests).await?;

        let mut handler = BookkeepingHandler::new(self.storage, self.quota);
        for outcome in outcomes {
            handler.on_result(&outcome.request_id, outcome.result)?;
        }

        report.submitted = handler.submitted();
        report.failed = handler.failed();

        tracing::info!(
            "Batch finished: {} submitted, {} failed",
            report.submitted,
            report.failed
        );

        Ok(report)
    }
}
