//! Durable stores for the raw and aggregate views
//!
//! Two complementary on-disk forms of the same day of data:
//!
//! - `csv` — the append-only raw time series, the canonical durable store;
//! - `workbook` — the derived spreadsheet with the minute-average table
//!   and its chart, rewritten wholesale on every flush.
//!
//! File handles are scoped to each call: acquired fresh, flushed and
//! released on every exit path. No handle is held across flush cycles,
//! so each flush is an independently durable unit of work.

pub mod csv;
pub mod workbook;

/// Header of the raw table, shared by both stores
pub const RAW_HEADER: [&str; 2] = ["Timestamp", "Pressure (bar)"];

/// Header of the derived minute-average table
pub const MINUTE_HEADER: [&str; 2] = ["Minute", "Average Pressure (bar)"];
