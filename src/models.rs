//! Data models for feeds, snapshots and archive artifacts.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SnapshotSet`]: the canonical `{dates, screens, map}` structure built from a raw feed
//! - [`DailySnapshot`]: one date's values, ordered by first-seen screen
//! - [`ArchiveRecord`]: the JSON artifact written by the archiver
//! - [`ForecastFeed`]: the feed written by the vendor forecast generator
//!
//! The raw feed itself is kept as [`serde_json::Value`] because its shape is
//! untrusted and validated by the normalizer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Fill rate at or above which the downstream UI shows a screen as sold out.
pub const SOLD_OUT_THRESHOLD: f64 = 0.934;

/// Canonical, normalized view of a raw feed.
///
/// `screens` keeps first-seen order across all day-records; consumers rely on
/// it for stable output ordering. `map` is keyed by screen name, then ISO date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotSet {
    /// ISO dates (`YYYY-MM-DD`), one per valid day-record, in feed order.
    pub dates: Vec<String>,
    /// Distinct screen names in first-seen order.
    pub screens: Vec<String>,
    /// `screen -> date -> fill rate`.
    pub map: HashMap<String, HashMap<String, f64>>,
    /// Upstream `generated_at`, passed through untouched.
    pub source_generated_at: Option<Value>,
}

impl SnapshotSet {
    /// Look up the value for a `(screen, date)` pair.
    pub fn value(&self, screen: &str, date: &str) -> Option<f64> {
        self.map.get(screen).and_then(|by_date| by_date.get(date)).copied()
    }
}

/// A single screen's value within a [`DailySnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenFillRate {
    pub screen: String,
    pub fill_rate: f64,
}

/// Values for exactly one date.
///
/// Entries follow the canonical screen order. Screens without a value for the
/// date are absent, never zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySnapshot {
    pub date: String,
    pub entries: Vec<ScreenFillRate>,
}

/// Metadata block of the archived JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMeta {
    /// How to interpret `fill_rate` values.
    pub note: String,
    /// Source locations tried during this run, in attempt order.
    pub source_urls: Vec<String>,
    /// Wall-clock time of the archival run, RFC 3339 UTC.
    pub archived_at_utc: String,
}

/// The JSON artifact written once per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub date: String,
    pub generated_at: Option<Value>,
    pub count: usize,
    pub rows: Vec<ScreenFillRate>,
    pub meta: ArchiveMeta,
}

/// A display unit as listed by the vendor API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub id: Value,
    pub name: String,
}

/// One screen's forecast for one date.
///
/// Exactly one of `rows_seen` / `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub id: Value,
    pub du_name: String,
    pub fill_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rows_seen: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// All screens for one forecast date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub count: usize,
    pub rows: Vec<ForecastRow>,
}

/// The forecast feed; the archiver consumes this same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFeed {
    pub generated_at: String,
    pub result: Vec<ForecastDay>,
}
