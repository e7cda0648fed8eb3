//! Archive artifact writers and their on-disk layout.
//!
//! # Submodules
//!
//! - [`json`]: the structured [`ArchiveRecord`](crate::models::ArchiveRecord)
//! - [`csv`]: flat `date,screen,fill_rate` rows in Icelandic collation order
//!
//! # Output Structure
//!
//! ```text
//! archive_dir/
//! └── 2024/
//!     └── 03/
//!         ├── 2024-03-01.json
//!         └── 2024-03-01.csv
//! ```
//!
//! Both writers go through [`write_atomic`], so an interrupted run never
//! leaves a truncated artifact behind for the idempotence check to trip over.

use crate::error::FillRateError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub mod csv;
pub mod json;

/// Where one date's artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePaths {
    pub dir: PathBuf,
    pub json: PathBuf,
    pub csv: PathBuf,
}

impl ArchivePaths {
    /// `{root}/{YYYY}/{MM}/{YYYY-MM-DD}.{json,csv}`
    pub fn for_date(root: &Path, date: NaiveDate) -> Self {
        let dir = root
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string());
        let stem = date.format("%Y-%m-%d").to_string();
        Self {
            json: dir.join(format!("{stem}.json")),
            csv: dir.join(format!("{stem}.csv")),
            dir,
        }
    }
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), FillRateError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)
        .await
        .map_err(|e| FillRateError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(FillRateError::io(path, e));
    }
    debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_segmented_by_year_and_padded_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let paths = ArchivePaths::for_date(Path::new("/srv/archive"), date);

        assert_eq!(paths.dir, PathBuf::from("/srv/archive/2024/03"));
        assert_eq!(paths.json, PathBuf::from("/srv/archive/2024/03/2024-03-01.json"));
        assert_eq!(paths.csv, PathBuf::from("/srv/archive/2024/03/2024-03-01.csv"));
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.json");

        write_atomic(&path, b"{}").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!tmp.path().join("out.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_atomic_reports_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing/out.json");

        let err = write_atomic(&path, b"{}").await.unwrap_err();
        assert!(matches!(err, FillRateError::Io { .. }));
        assert!(!path.exists());
    }
}
