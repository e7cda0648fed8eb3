//! Utility functions for URLs, logging, collation and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Cache-busting query parameters for feed fetches
//! - String truncation for logging response bodies
//! - Icelandic collation for human-facing CSV output
//! - File system validation for output directories

use crate::error::FillRateError;
use chrono::Utc;
use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use rand::{Rng, rng};
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};
use url::Url;

/// Query parameter appended to every feed fetch.
pub const CACHE_BUST_PARAM: &str = "_cb";

/// Append a cache-busting query parameter to `url`.
///
/// The token is the current UTC time in milliseconds plus a random suffix, so
/// two fetches in the same millisecond still differ. Existing query
/// parameters are preserved.
///
/// # Errors
///
/// Returns [`FillRateError::Config`] if `url` is not an absolute URL.
pub fn cache_busted(url: &str) -> Result<Url, FillRateError> {
    let mut parsed =
        Url::parse(url).map_err(|e| FillRateError::Config(format!("invalid URL {url}: {e}")))?;
    let token = format!(
        "{}{:04}",
        Utc::now().timestamp_millis(),
        rng().random_range(0..10_000u32)
    );
    parsed.query_pairs_mut().append_pair(CACHE_BUST_PARAM, &token);
    Ok(parsed)
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Sort names in Icelandic collation order (á after a, ð after d, þ æ ö after z).
///
/// Falls back to plain code-point order if the collation data cannot be
/// loaded, which only affects row order in the CSV, never its content.
pub fn sort_icelandic(names: &mut [String]) {
    match Collator::try_new(&locale!("is").into(), CollatorOptions::new()) {
        Ok(collator) => names.sort_by(|a, b| collator.compare(a, b)),
        Err(e) => {
            warn!(error = %e, "Icelandic collation unavailable; using code-point order");
            names.sort_by(|a, b| a.cmp(b));
        }
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns [`FillRateError::Io`] if the directory cannot be created or is not
/// writable (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), FillRateError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| FillRateError::io(path, e))?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(FillRateError::io(path, e)),
    }
}
