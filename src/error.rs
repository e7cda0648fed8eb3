//! Error types shared by the forecast and archive pipelines.
//!
//! Per-row data problems in a feed are deliberately absent here: the
//! normalizer counts and skips them instead of failing the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One failed attempt against a candidate source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// The candidate URL as configured (without the cache-busting parameter).
    pub url: String,
    /// Human-readable failure reason (transport error or HTTP status).
    pub reason: String,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

/// Errors that terminate a forecast or archive run.
#[derive(Error, Debug)]
pub enum FillRateError {
    /// Required configuration missing or invalid; raised before any network activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// A single request failed at the transport level or with a non-success status.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Every candidate source failed.
    #[error("all sources failed: {}", format_failures(.0))]
    AllSourcesFailed(Vec<SourceFailure>),

    /// The feed JSON does not have the expected envelope.
    #[error("unexpected feed shape: {0}")]
    Shape(String),

    /// Login failed, or the vendor rejected a request twice in a row.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Directory creation, existence check or file write failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FillRateError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FillRateError::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
