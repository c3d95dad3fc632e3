use crate::storage::Storage;
use crate::{ConfigError, IndexerError};
use chrono::{Duration, Utc};

/// Checks whether stored URLs have been indexed
///
/// Index status verification has no backing service yet, so this only
/// collects the URLs that are due for a check (not indexed, and never checked
/// or last checked more than `recheck_after_days` ago) and reports how many
/// there are. No record is modified.
pub fn check_indexing(
    storage: &dyn Storage,
    recheck_after_days: i64,
) -> Result<usize, IndexerError> {
    let cutoff = Duration::try_days(recheck_after_days)
        .and_then(|interval| Utc::now().checked_sub_signed(interval))
        .ok_or_else(|| {
            ConfigError::Validation(format!(
                "recheck_after_days {} is out of range",
                recheck_after_days
            ))
        })?;
    let due = storage.load_unindexed_urls(cutoff)?;

    tracing::warn!(
        "Index status verification is not implemented; {} URLs are due for a check",
        due.len()
    );

    Ok(due.len())
}
