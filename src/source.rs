//! Feed retrieval with an ordered fallback chain.
//!
//! The archiver is configured with one or more candidate locations for the
//! published fill-rate feed. [`SourceClient`] tries them in order and returns
//! the first body that arrives with a 2xx status and parses as JSON.
//!
//! # Architecture
//!
//! - [`FetchJson`]: the seam the archive run depends on, so it can be driven
//!   by a stub in tests
//! - [`SourceClient`]: the `reqwest` implementation
//!
//! There are no per-candidate retries, no backoff and no timeout beyond the
//! transport default; a failed candidate simply moves the chain along.

use crate::error::{FillRateError, SourceFailure};
use crate::utils::{cache_busted, truncate_for_log};
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Result of a successful fetch: the body plus which candidate produced it.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub url: String,
    pub body: Value,
    /// Candidates that failed before `url` succeeded, in attempt order.
    pub failures: Vec<SourceFailure>,
}

impl Fetched {
    /// Every location tried, in order: the failed ones, then the one that answered.
    pub fn attempted(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| f.url.clone())
            .chain(std::iter::once(self.url.clone()))
            .collect()
    }
}

/// Fetch the first JSON body available from an ordered list of candidates.
pub trait FetchJson {
    /// Try each candidate in order.
    ///
    /// # Errors
    ///
    /// [`FillRateError::AllSourcesFailed`] listing every candidate and its
    /// failure reason when none succeeds.
    async fn fetch_json(&self, candidates: &[String]) -> Result<Fetched, FillRateError>;
}

/// HTTP implementation of [`FetchJson`].
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
}

impl SourceClient {
    pub fn new() -> Result<Self, FillRateError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch one candidate; any error is returned as a failure reason.
    #[instrument(level = "debug", skip(self))]
    async fn try_candidate(&self, url: &str) -> Result<Value, String> {
        let busted = cache_busted(url).map_err(|e| e.to_string())?;
        let resp = self
            .http
            .get(busted)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(%status, body = %truncate_for_log(&body, 200), "Non-success response body");
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let text = resp.text().await.map_err(|e| e.to_string())?;
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {e}"))
    }
}

impl FetchJson for SourceClient {
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    async fn fetch_json(&self, candidates: &[String]) -> Result<Fetched, FillRateError> {
        let mut failures = Vec::new();

        for url in candidates {
            match self.try_candidate(url).await {
                Ok(body) => {
                    info!(%url, failed_before = failures.len(), "Fetched feed");
                    return Ok(Fetched {
                        url: url.clone(),
                        body,
                        failures,
                    });
                }
                Err(reason) => {
                    warn!(%url, %reason, "Feed source failed; trying next candidate");
                    failures.push(SourceFailure {
                        url: url.clone(),
                        reason,
                    });
                }
            }
        }

        Err(FillRateError::AllSourcesFailed(failures))
    }
}
