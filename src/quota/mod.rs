//! Daily submission quota tracking
//!
//! The Indexing API grants a fixed number of publish requests per day. Each
//! calendar day has its own counter row, so the quota resets implicitly when
//! the date changes.

use crate::storage::{Storage, StorageResult};
use chrono::Local;

/// Returns today's quota key in `YYYY-MM-DD` form (local time)
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Reads and advances the per-day submission counter
#[derive(Debug, Clone, Copy)]
pub struct QuotaTracker {
    daily_limit: u32,
}

impl QuotaTracker {
    /// Creates a tracker enforcing `daily_limit` submissions per day
    pub fn new(daily_limit: u32) -> Self {
        Self { daily_limit }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Returns the number of submissions made today
    ///
    /// Creates today's counter at zero if it does not exist yet.
    pub fn used(&self, storage: &mut dyn Storage) -> StorageResult<u32> {
        Ok(storage.get_or_create_quota(&today())?.count)
    }

    /// Records one submission attempt against today's counter
    ///
    /// # Returns
    ///
    /// The counter value after the increment
    pub fn increment(&self, storage: &mut dyn Storage) -> StorageResult<u32> {
        let count = storage.increment_quota(&today())?;
        tracing::trace!("Quota now {}/{}", count, self.daily_limit);
        Ok(count)
    }

    /// Returns how many submissions remain for a given usage
    ///
    /// Zero once `used` reaches the limit; the counter itself may run past it.
    pub fn remaining_after(&self, used: u32) -> u32 {
        self.daily_limit.saturating_sub(used)
    }
}
