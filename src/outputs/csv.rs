//! CSV archive artifact.
//!
//! Unlike the JSON artifact, rows are sorted in Icelandic collation order so
//! the file reads naturally for people scanning screen names.

use crate::error::FillRateError;
use crate::models::DailySnapshot;
use crate::outputs::write_atomic;
use crate::utils::sort_icelandic;
use serde_json::Number;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, instrument};

pub const HEADER: &str = "date,screen,fill_rate";

/// Quote a field containing a comma, double quote or line break; inner quotes are doubled.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// A fill rate written the way the JSON artifact writes it (`1.0`, `1e-7`).
pub fn format_fill_rate(value: f64) -> String {
    Number::from_f64(value).map_or_else(|| value.to_string(), |n| n.to_string())
}

/// Header plus one row per screen, trailing newline included.
pub fn render(snapshot: &DailySnapshot) -> String {
    let values: HashMap<&str, f64> = snapshot
        .entries
        .iter()
        .map(|e| (e.screen.as_str(), e.fill_rate))
        .collect();
    let mut screens: Vec<String> = snapshot.entries.iter().map(|e| e.screen.clone()).collect();
    sort_icelandic(&mut screens);

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for screen in &screens {
        out.push_str(&format!(
            "{},{},{}\n",
            escape_field(&snapshot.date),
            escape_field(screen),
            format_fill_rate(values[screen.as_str()])
        ));
    }
    out
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_csv(snapshot: &DailySnapshot, path: &Path) -> Result<(), FillRateError> {
    let csv = render(snapshot);
    write_atomic(path, csv.as_bytes()).await?;
    info!(rows = snapshot.entries.len(), "Wrote archive CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScreenFillRate;

    fn snapshot(entries: &[(&str, f64)]) -> DailySnapshot {
        DailySnapshot {
            date: "2024-03-01".to_string(),
            entries: entries
                .iter()
                .map(|(screen, fill_rate)| ScreenFillRate {
                    screen: screen.to_string(),
                    fill_rate: *fill_rate,
                })
                .collect(),
        }
    }

    #[test]
    fn test_single_row() {
        assert_eq!(
            render(&snapshot(&[("A", 0.5)])),
            "date,screen,fill_rate\n2024-03-01,A,0.5\n"
        );
    }

    #[test]
    fn test_rows_use_icelandic_order() {
        let csv = render(&snapshot(&[("Zeta", 0.5), ("Alpha", 0.2), ("Miðbær", 0.9)]));
        assert_eq!(
            csv,
            "date,screen,fill_rate\n\
             2024-03-01,Alpha,0.2\n\
             2024-03-01,Miðbær,0.9\n\
             2024-03-01,Zeta,0.5\n"
        );
    }

    #[test]
    fn test_empty_snapshot_is_header_only() {
        assert_eq!(render(&snapshot(&[])), "date,screen,fill_rate\n");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Kringlan"), "Kringlan");
        assert_eq!(escape_field("Hall, east"), "\"Hall, east\"");
        assert_eq!(escape_field("The \"Big\" One"), "\"The \"\"Big\"\" One\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_escaped_screen_in_row() {
        let csv = render(&snapshot(&[("Hall, east", 1.0)]));
        assert_eq!(csv, "date,screen,fill_rate\n2024-03-01,\"Hall, east\",1.0\n");
    }

    #[test]
    fn test_numbers_match_json_rendering() {
        for value in [1e-7, 0.934, 1.0, 0.0, 12345678.9] {
            assert_eq!(format_fill_rate(value), serde_json::to_string(&value).unwrap());
        }
        let csv = render(&snapshot(&[("A", 1e-7)]));
        assert_eq!(csv, "date,screen,fill_rate\n2024-03-01,A,1e-7\n");
    }
}
