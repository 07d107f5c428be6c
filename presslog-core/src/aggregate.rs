//! Per-minute aggregation of the raw reading history
//!
//! The aggregate table is always a full recomputation over the day's
//! history, never an incremental merge. That keeps the derived view free
//! of drift at the cost of an `O(n)` pass per flush, which is acceptable:
//! the flush cadence is coarse and history is bounded by daily rotation.

use std::collections::BTreeMap;

use crate::reading::Reading;

/// One row of the derived minute-average table
#[derive(Debug, Clone, PartialEq)]
pub struct MinuteRow {
    /// Minute key, `YYYY-MM-DD HH:MM`
    pub minute: String,
    /// Arithmetic mean of the minute's values, rounded to 3 decimals
    pub average: f64,
}

/// Compute minute averages over the full raw history
///
/// Readings are grouped by the first 16 characters of their timestamp.
/// Rows with a short timestamp or non-finite value are skipped; the
/// store may contain structural gaps from prior partial writes. Output
/// is sorted ascending by minute key, which for this fixed-width
/// zero-padded format is chronological order.
///
/// Averages are rounded half-to-even to 3 decimal digits.
pub fn minute_averages(rows: &[Reading]) -> Vec<MinuteRow> {
    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for reading in rows {
        let minute = match reading.minute_key() {
            Some(key) => key,
            None => continue,
        };
        if !reading.value.is_finite() {
            continue;
        }
        grouped.entry(minute).or_default().push(reading.value);
    }

    grouped
        .into_iter()
        .map(|(minute, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            MinuteRow {
                minute: minute.to_string(),
                average: round_3(mean),
            }
        })
        .collect()
}

/// Round half-to-even at 3 decimal digits
fn round_3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}
