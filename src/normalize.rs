//! Reshape a raw fill-rate feed into a [`SnapshotSet`].
//!
//! The feed is untrusted JSON. Only the envelope is validated strictly: the
//! top level must be an object with a `result` array. Below that, bad data is
//! filtered out at the smallest granularity that contains it:
//!
//! | Problem | Effect |
//! |---------|--------|
//! | day-record date missing or unparsable | whole day-record skipped |
//! | row identifier missing or blank | row skipped |
//! | row value not a finite number | row skipped, screen still registered |
//!
//! Skips are counted in [`NormalizeStats`] so callers can surface data
//! quality without changing which rows are accepted.

use crate::error::FillRateError;
use crate::models::SnapshotSet;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use tracing::debug;

/// Row fields tried in order for the screen name.
const SCREEN_FIELDS: [&str; 3] = ["du_name", "screen", "name"];
/// Row field holding the fill fraction.
const VALUE_FIELD: &str = "fill_rate";

/// Counts of input filtered out during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub days_skipped: usize,
    pub rows_missing_screen: usize,
    pub rows_invalid_value: usize,
}

impl NormalizeStats {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Build the canonical set from a raw feed.
///
/// `dates` gets one entry per valid day-record (duplicates kept), `screens`
/// keeps first-seen order, and a repeated `(screen, date)` pair keeps the
/// value of the last row seen.
///
/// # Errors
///
/// [`FillRateError::Shape`] if the feed is not an object with a `result` array.
pub fn normalize(feed: &Value) -> Result<(SnapshotSet, NormalizeStats), FillRateError> {
    let days = feed
        .get("result")
        .and_then(Value::as_array)
        .ok_or_else(|| FillRateError::Shape("expected an object with a `result` array".into()))?;

    let mut set = SnapshotSet {
        source_generated_at: feed.get("generated_at").cloned(),
        ..SnapshotSet::default()
    };
    let mut stats = NormalizeStats::default();
    let mut seen: HashSet<String> = HashSet::new();

    for day in days {
        let Some(date) = day.get("date").and_then(parse_date) else {
            debug!(date = ?day.get("date"), "Skipping day-record with unparsable date");
            stats.days_skipped += 1;
            continue;
        };
        let iso = date.format("%Y-%m-%d").to_string();
        set.dates.push(iso.clone());

        let rows = day.get("rows").and_then(Value::as_array);
        for row in rows.into_iter().flatten() {
            let Some(row) = row.as_object() else {
                stats.rows_missing_screen += 1;
                continue;
            };
            let Some(screen) = screen_name(row) else {
                stats.rows_missing_screen += 1;
                continue;
            };
            if seen.insert(screen.clone()) {
                set.screens.push(screen.clone());
            }
            let Some(value) = row.get(VALUE_FIELD).and_then(parse_value) else {
                stats.rows_invalid_value += 1;
                continue;
            };
            set.map.entry(screen).or_default().insert(iso.clone(), value);
        }
    }

    Ok((set, stats))
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp (taken in UTC).
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// The trimmed, non-empty string form of the first identifier field present.
fn screen_name(row: &Map<String, Value>) -> Option<String> {
    let raw = SCREEN_FIELDS
        .iter()
        .find_map(|field| row.get(*field).filter(|v| !v.is_null()))?;
    let name = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => number_name(n),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!name.is_empty()).then_some(name)
}

/// Integral numbers render without a fractional part, so `7` and `7.0` name the same screen.
fn number_name(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Numbers and numeric strings, finite only.
fn parse_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
