//! Command-line interface definitions.
//!
//! Every option can also be supplied through an environment variable, which
//! is how the scheduled jobs are configured. Required values are validated
//! into typed configs before any network activity happens.

use crate::archive::ArchiveConfig;
use crate::error::FillRateError;
use crate::vendor::forecast::ForecastConfig;
use crate::vendor::session::Credentials;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Build the 30-day forecast feed from the vendor API
/// VENDOR_USERNAME=me VENDOR_PASSWORD=secret \
///     fillrate_archive forecast --vendor-base-url https://reports.example.com
///
/// # Archive today's snapshot, falling back to a mirror
/// fillrate_archive archive \
///     --source-url https://cdn.example.com/fillrate.json,https://mirror.example.com/fillrate.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch per-screen fill rates from the vendor API and write the forecast feed
    Forecast(ForecastArgs),
    /// Archive today's snapshot of the published feed as JSON and CSV
    Archive(ArchiveArgs),
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Base URL of the vendor reporting API
    #[arg(long, env = "VENDOR_BASE_URL")]
    pub vendor_base_url: Option<String>,

    /// Vendor account username
    #[arg(long, env = "VENDOR_USERNAME")]
    pub vendor_username: Option<String>,

    /// Vendor account password
    #[arg(long, env = "VENDOR_PASSWORD", hide_env_values = true)]
    pub vendor_password: Option<String>,

    /// Where to write the forecast feed
    #[arg(short, long, env = "FILLRATE_OUTPUT", default_value = "data/fillrate.json")]
    pub output: PathBuf,

    /// Number of days to forecast, starting today (UTC)
    #[arg(long, env = "FILLRATE_DAYS", default_value_t = 30)]
    pub days: u32,

    /// Report requests in flight at once
    #[arg(long, env = "FILLRATE_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Feed URLs to try in order (repeat the flag or separate with commas)
    #[arg(long = "source-url", env = "FILLRATE_SOURCE_URLS", value_delimiter = ',')]
    pub source_urls: Vec<String>,

    /// Root directory of the YYYY/MM archive tree
    #[arg(short, long, env = "FILLRATE_ARCHIVE_DIR", default_value = "archive")]
    pub archive_dir: PathBuf,
}

fn required(value: &Option<String>, flag: &str, env: &str) -> Result<String, FillRateError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FillRateError::Config(format!("missing {flag} (or {env})")))
}

impl ForecastArgs {
    /// Validate into `(base_url, credentials, config)`.
    pub fn validate(&self) -> Result<(String, Credentials, ForecastConfig), FillRateError> {
        let base_url = required(&self.vendor_base_url, "--vendor-base-url", "VENDOR_BASE_URL")?;
        let username = required(&self.vendor_username, "--vendor-username", "VENDOR_USERNAME")?;
        let password = required(&self.vendor_password, "--vendor-password", "VENDOR_PASSWORD")?;
        if self.days == 0 {
            return Err(FillRateError::Config("--days must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(FillRateError::Config("--concurrency must be at least 1".into()));
        }
        Ok((
            base_url,
            Credentials { username, password },
            ForecastConfig {
                days: self.days,
                concurrency: self.concurrency,
            },
        ))
    }
}

impl ArchiveArgs {
    pub fn validate(&self) -> Result<ArchiveConfig, FillRateError> {
        let source_urls: Vec<String> = self
            .source_urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if source_urls.is_empty() {
            return Err(FillRateError::Config(
                "no feed sources configured; pass --source-url or set FILLRATE_SOURCE_URLS".into(),
            ));
        }
        Ok(ArchiveConfig {
            source_urls,
            archive_dir: self.archive_dir.clone(),
        })
    }
}
