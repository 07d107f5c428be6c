//! Sensor line parsing
//!
//! The transducer emits one reading per line in the form `P=<value>`.
//! Parsing is a pure function of the line and the current wall-clock time;
//! the timestamp is taken at the moment of successful parse, never from
//! the line itself.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::clock::TIMESTAMP_FORMAT;

/// One validated pressure sample
///
/// Immutable once created. Owned by the session buffer until flushed,
/// after which the persisted stores are the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Local wall-clock time of the parse, `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// Pressure in bar
    #[serde(rename = "Pressure (bar)")]
    pub value: f64,
}

impl Reading {
    /// First 16 characters of the timestamp: `YYYY-MM-DD HH:MM`
    ///
    /// `None` for structurally short timestamps read back from a store
    /// with gaps from prior partial writes.
    pub fn minute_key(&self) -> Option<&str> {
        self.timestamp.get(..16)
    }
}

/// Why a line was not accepted as a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseRejection {
    /// Line does not start with the exact prefix `P=`
    #[error("missing P= prefix")]
    MissingPrefix,
    /// Remainder after the prefix is not a decimal number
    #[error("value is not numeric")]
    NotNumeric,
    /// Remainder parsed but is NaN or infinite
    #[error("value is not finite")]
    NonFinite,
}

/// Parse one raw line into a [`Reading`]
///
/// The prefix is exactly two characters, case-sensitive. The remainder
/// must be a finite decimal number (sign, fraction, and exponent are
/// accepted). Rejections carry the reason so the caller can log them;
/// they never abort the pipeline.
pub fn parse_line(line: &str, now: NaiveDateTime) -> Result<Reading, ParseRejection> {
    let value_str = line.strip_prefix("P=").ok_or(ParseRejection::MissingPrefix)?;
    let value: f64 = value_str.parse().map_err(|_| ParseRejection::NotNumeric)?;
    if !value.is_finite() {
        return Err(ParseRejection::NonFinite);
    }

    Ok(Reading {
        timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        value,
    })
}
