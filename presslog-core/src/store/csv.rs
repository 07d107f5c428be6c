//! Append-only raw CSV store
//!
//! Row 1 is the header, every following row is one reading in arrival
//! order. The file is never truncated after creation; initialization is
//! idempotent so a same-day restart appends to the existing file.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use crate::errors::StoreError;
use crate::reading::Reading;

use super::RAW_HEADER;

/// Create the store with its header if it does not exist yet
///
/// Idempotent: an existing file is left untouched, rows and all.
pub fn init(path: &Path) -> Result<(), StoreError> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(RAW_HEADER)
        .map_err(|e| StoreError::csv(path, e))?;
    writer.flush().map_err(|e| StoreError::io(path, e))
}

/// Append a batch of readings in arrival order
pub fn append(path: &Path, readings: &[Reading]) -> Result<(), StoreError> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for reading in readings {
        writer
            .serialize(reading)
            .map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))
}

/// Read a day's rows back from the store
///
/// Used to seed the in-memory day table on a same-day restart, and by
/// tests for the round-trip property. Structurally bad rows (short
/// records, unparsable values, leftovers of a prior partial write) are
/// skipped rather than failing the read. A missing file reads as empty.
pub fn read_day(path: &Path) -> Result<Vec<Reading>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => continue,
        };
        let timestamp = match record.get(0) {
            Some(ts) if !ts.is_empty() => ts,
            _ => continue,
        };
        let value = match record.get(1).map(str::parse::<f64>) {
            Some(Ok(value)) => value,
            _ => continue,
        };
        rows.push(Reading {
            timestamp: timestamp.to_string(),
            value,
        });
    }
    Ok(rows)
}
