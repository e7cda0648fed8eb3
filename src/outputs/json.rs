//! JSON archive artifact.
//!
//! Rows keep the canonical first-seen screen order of the snapshot.

use crate::error::FillRateError;
use crate::models::{ArchiveMeta, ArchiveRecord, DailySnapshot, SOLD_OUT_THRESHOLD};
use crate::outputs::write_atomic;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::path::Path;
use tracing::{info, instrument};

/// Assemble the record for one archived date.
pub fn build_record(
    snapshot: &DailySnapshot,
    generated_at: Option<Value>,
    source_urls: &[String],
    archived_at: DateTime<Utc>,
) -> ArchiveRecord {
    ArchiveRecord {
        date: snapshot.date.clone(),
        generated_at,
        count: snapshot.entries.len(),
        rows: snapshot.entries.clone(),
        meta: ArchiveMeta {
            note: format!(
                "fill_rate is the filled fraction of inventory (0-1); values >= {SOLD_OUT_THRESHOLD} are shown as sold out"
            ),
            source_urls: source_urls.to_vec(),
            archived_at_utc: archived_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    }
}

/// Serialize `record` (pretty, trailing newline) to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_record(record: &ArchiveRecord, path: &Path) -> Result<(), FillRateError> {
    let mut json = serde_json::to_string_pretty(record)?;
    json.push('\n');
    write_atomic(path, json.as_bytes()).await?;
    info!(count = record.count, "Wrote archive JSON");
    Ok(())
}
