//! Slice a [`SnapshotSet`] down to one date.

use crate::models::{DailySnapshot, ScreenFillRate, SnapshotSet};

/// Values for `date`, in canonical screen order.
///
/// Screens with no value on `date` are left out rather than zero-filled;
/// an absent screen means its data had not arrived yet.
pub fn extract(set: &SnapshotSet, date: &str) -> DailySnapshot {
    let entries = set
        .screens
        .iter()
        .filter_map(|screen| {
            set.value(screen, date).map(|fill_rate| ScreenFillRate {
                screen: screen.clone(),
                fill_rate,
            })
        })
        .collect();

    DailySnapshot {
        date: date.to_string(),
        entries,
    }
}
