//! Bulk loading of URLs from a seed file
//!
//! The seed file holds one URL per line. After its URLs are stored the file is
//! truncated, so the same file can be appended to and loaded again later.
//! Adding and truncating are separate steps: if the process dies in between,
//! re-running the load is harmless because duplicate URLs are skipped.

use crate::storage::Storage;
use crate::IndexerError;
use std::path::Path;
use url::Url;

/// Outcome of a file load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Non-blank lines read from the file
    pub read: usize,
    /// URLs that were not stored before
    pub added: usize,
}

/// Extracts the URLs from seed file content
///
/// Lines are trimmed and blank lines skipped. Lines that do not parse as
/// absolute URLs are kept but reported.
pub fn parse_seed_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .inspect(|line| {
            if Url::parse(line).is_err() {
                tracing::warn!("'{}' is not an absolute URL; storing it anyway", line);
            }
        })
        .map(str::to_string)
        .collect()
}

/// Loads URLs from `path` into storage, then empties the file
///
/// # Arguments
///
/// * `storage` - The record store
/// * `path` - The seed file
///
/// # Returns
///
/// * `Ok(LoadReport)` - The counts of read and newly stored URLs
/// * `Err(IndexerError)` - The file could not be read or truncated, or a store
///   write failed
pub fn load_urls_from_file(
    storage: &mut dyn Storage,
    path: &Path,
) -> Result<LoadReport, IndexerError> {
    let content = std::fs::read_to_string(path)?;
    let urls = parse_seed_lines(&content);

    let added = storage.add_urls(&urls)?;
    tracing::info!(
        "Read {} URLs from {}, {} new",
        urls.len(),
        path.display(),
        added
    );

    std::fs::write(path, "")?;

    Ok(LoadReport {
        read: urls.len(),
        added,
    })
}
