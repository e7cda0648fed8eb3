//! # Fill Rate Archive
//!
//! Collects digital-signage fill rates (how much of each screen's ad
//! inventory is sold) and keeps a day-by-day history of them.
//!
//! ## Usage
//!
//! ```sh
//! fillrate_archive forecast --vendor-base-url https://reports.example.com
//! fillrate_archive archive --source-url https://cdn.example.com/fillrate.json
//! ```
//!
//! ## Architecture
//!
//! Two independent one-shot jobs share only the feed's JSON shape:
//!
//! 1. **forecast**: log in to the vendor API, fetch every screen's report for
//!    the next 30 days and write the forecast feed
//! 2. **archive**: fetch the published feed (with fallbacks), normalize it,
//!    take today's values and write them once as `YYYY/MM/YYYY-MM-DD.{json,csv}`

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod archive;
mod cli;
mod error;
mod models;
mod normalize;
mod outputs;
mod snapshot;
mod source;
#[cfg(test)]
mod test_support;
mod utils;
mod vendor;

use archive::{ArchiveOutcome, archive_today};
use cli::{ArchiveArgs, Cli, Command, ForecastArgs};
use error::FillRateError;
use source::SourceClient;
use utils::ensure_writable_dir;
use vendor::forecast::run_forecast;
use vendor::session::{SessionState, VendorSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(command = command_name(&args.command), "Parsed CLI arguments");

    let result = match &args.command {
        Command::Forecast(forecast) => forecast_cmd(forecast).await,
        Command::Archive(archive) => archive_cmd(archive).await,
    };

    let elapsed = start_time.elapsed();
    match result {
        Ok(()) => {
            info!(?elapsed, "Execution complete");
            Ok(())
        }
        Err(e) => {
            error!(?elapsed, error = %e, "Run failed");
            Err(e.into())
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Forecast(_) => "forecast",
        Command::Archive(_) => "archive",
    }
}

async fn forecast_cmd(args: &ForecastArgs) -> Result<(), FillRateError> {
    let (base_url, credentials, config) = args.validate()?;
    info!(%base_url, days = config.days, concurrency = config.concurrency, "Building forecast");

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_writable_dir(parent).await?;
    }

    let session = VendorSession::new(&base_url, credentials)?;
    let feed = run_forecast(&session, &config, &args.output).await?;
    let authenticated = matches!(session.state().await, SessionState::Authenticated { .. });
    debug!(authenticated, "Vendor session at exit");
    info!(path = %args.output.display(), days = feed.result.len(), "Forecast written");
    Ok(())
}

async fn archive_cmd(args: &ArchiveArgs) -> Result<(), FillRateError> {
    let config = args.validate()?;
    ensure_writable_dir(&config.archive_dir).await?;

    let client = SourceClient::new()?;
    match archive_today(&client, &config).await? {
        ArchiveOutcome::AlreadyArchived { path } => {
            info!(path = %path.display(), "Already archived today; exiting");
        }
        ArchiveOutcome::Written { json, csv, screens } => {
            info!(
                json = %json.display(),
                csv = %csv.display(),
                screens,
                "Archived snapshot"
            );
        }
    }
    Ok(())
}
