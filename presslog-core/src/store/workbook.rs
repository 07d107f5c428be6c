//! Aggregate workbook store
//!
//! One sheet named `Data`: the raw table in columns A–B (same contract as
//! the CSV store), the derived minute-average block in columns D–E, and a
//! single line chart anchored at G2 plotting column E against the column D
//! labels. The writer library is write-only, so every flush regenerates
//! the whole workbook from the in-memory day table; the previous chart is
//! discarded by the rewrite. The CSV remains the canonical durable store
//! the day table is seeded from.

use std::path::Path;

use rust_xlsxwriter::{Chart, ChartType, Workbook};

use crate::aggregate::MinuteRow;
use crate::errors::StoreError;
use crate::reading::Reading;

use super::{MINUTE_HEADER, RAW_HEADER};

/// Sheet holding both tables and the chart
const SHEET_NAME: &str = "Data";

/// Create an empty workbook (headers only) if none exists yet
///
/// Idempotent: an existing workbook is left untouched so a same-day
/// restart keeps its content until the first flush rewrites it.
pub fn init(path: &Path) -> Result<(), StoreError> {
    if path.exists() {
        return Ok(());
    }
    write(path, &[], &[])
}

/// Rewrite the whole workbook from the day's data
pub fn write(path: &Path, rows: &[Reading], minutes: &[MinuteRow]) -> Result<(), StoreError> {
    build(rows, minutes)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| StoreError::workbook(path, e))
}

fn build(
    rows: &[Reading],
    minutes: &[MinuteRow],
) -> Result<Workbook, rust_xlsxwriter::XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    // Raw table, columns A-B
    sheet.write_string(0, 0, RAW_HEADER[0])?;
    sheet.write_string(0, 1, RAW_HEADER[1])?;
    for (i, reading) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &reading.timestamp)?;
        sheet.write_number(row, 1, reading.value)?;
    }

    // Minute averages, columns D-E
    sheet.write_string(0, 3, MINUTE_HEADER[0])?;
    sheet.write_string(0, 4, MINUTE_HEADER[1])?;
    for (i, minute) in minutes.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 3, &minute.minute)?;
        sheet.write_number(row, 4, minute.average)?;
    }

    if !minutes.is_empty() {
        let last_row = minutes.len() as u32;
        let mut chart = Chart::new(ChartType::Line);
        chart.title().set_name("Average Pressure per Minute");
        chart.x_axis().set_name(MINUTE_HEADER[0]);
        chart.y_axis().set_name("Pressure (bar)");
        chart
            .add_series()
            .set_values((SHEET_NAME, 1, 4, last_row, 4))
            .set_categories((SHEET_NAME, 1, 3, last_row, 3))
            .set_name(MINUTE_HEADER[1]);
        sheet.insert_chart(1, 6, &chart)?;
    }

    Ok(workbook)
}
