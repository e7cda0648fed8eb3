//! Daily archival run.
//!
//! One run archives one UTC date and moves through these steps:
//!
//! 1. **Check**: if the date's JSON artifact already exists, stop with
//!    [`ArchiveOutcome::AlreadyArchived`]. Nothing is fetched or written.
//! 2. **Fetch**: fetch the feed through the [`FetchJson`] fallback chain,
//!    normalize it and extract the target date.
//! 3. **Write JSON**, then **write CSV**.
//!
//! Any error ends the run. The JSON file is only renamed into place once it
//! is complete, so a failed run either leaves nothing or leaves a JSON
//! artifact that a rerun treats as done.

use crate::error::FillRateError;
use crate::normalize::normalize;
use crate::outputs::{ArchivePaths, csv, json};
use crate::snapshot::extract;
use crate::source::FetchJson;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Settings for a single archive run.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Candidate feed locations, tried in order.
    pub source_urls: Vec<String>,
    /// Root of the `YYYY/MM/` tree.
    pub archive_dir: PathBuf,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveOutcome {
    /// The JSON artifact was already present; nothing was touched.
    AlreadyArchived { path: PathBuf },
    /// Both artifacts were written.
    Written {
        json: PathBuf,
        csv: PathBuf,
        screens: usize,
    },
}

/// Archive `date`, stamping the record with `now`.
///
/// `date` is normally today's UTC date. If the feed has no rows for it, an
/// empty snapshot is archived, which is how a reporting gap shows up.
#[instrument(level = "info", skip_all, fields(%date, archive_dir = %config.archive_dir.display()))]
pub async fn archive_date<F: FetchJson>(
    fetcher: &F,
    config: &ArchiveConfig,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<ArchiveOutcome, FillRateError> {
    let paths = ArchivePaths::for_date(&config.archive_dir, date);

    if exists(&paths.json).await? {
        info!(path = %paths.json.display(), "Snapshot already archived; nothing to do");
        return Ok(ArchiveOutcome::AlreadyArchived { path: paths.json });
    }

    let fetched = fetcher.fetch_json(&config.source_urls).await?;
    let (set, stats) = normalize(&fetched.body)?;
    if !stats.is_clean() {
        info!(
            days_skipped = stats.days_skipped,
            rows_missing_screen = stats.rows_missing_screen,
            rows_invalid_value = stats.rows_invalid_value,
            "Filtered malformed feed entries"
        );
    }
    info!(
        source = %fetched.url,
        dates = set.dates.len(),
        screens = set.screens.len(),
        "Normalized feed"
    );

    let iso = date.format("%Y-%m-%d").to_string();
    let snapshot = extract(&set, &iso);
    if snapshot.entries.is_empty() {
        warn!(date = %iso, "Feed has no values for the target date; archiving an empty snapshot");
    }

    fs::create_dir_all(&paths.dir)
        .await
        .map_err(|e| FillRateError::io(&paths.dir, e))?;

    let attempted = fetched.attempted();
    let record = json::build_record(&snapshot, set.source_generated_at, &attempted, now);
    json::write_record(&record, &paths.json).await?;
    csv::write_csv(&snapshot, &paths.csv).await?;

    Ok(ArchiveOutcome::Written {
        json: paths.json,
        csv: paths.csv,
        screens: snapshot.entries.len(),
    })
}

/// Archive today's UTC date.
pub async fn archive_today<F: FetchJson>(
    fetcher: &F,
    config: &ArchiveConfig,
) -> Result<ArchiveOutcome, FillRateError> {
    let now = Utc::now();
    archive_date(fetcher, config, now.date_naive(), now).await
}

async fn exists(path: &Path) -> Result<bool, FillRateError> {
    fs::try_exists(path)
        .await
        .map_err(|e| FillRateError::io(path, e))
}
