//! Error types for the logging pipeline
//!
//! The taxonomy follows the pipeline's failure boundaries:
//!
//! - parse rejections live in [`crate::reading`] and are warnings, not errors;
//! - a read timeout is `nb::Error::WouldBlock`, "no input this tick";
//! - [`TransportError`] is a real transport fault;
//! - [`StoreError`] is a failure against one physical destination, carrying
//!   the path so partial failures can be reported precisely;
//! - [`FlushReport`] aggregates the per-destination outcome of one flush.

use std::path::PathBuf;

use thiserror::Error;

/// Fault on the line transport (distinct from a timeout)
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not be opened at startup
    #[error("failed to open {port}: {source}")]
    Open {
        /// Device or endpoint that was being opened
        port: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
    /// A read failed mid-session
    #[error("transport read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Failure writing or reading one physical store path
#[derive(Debug, Error)]
pub enum StoreError {
    /// Plain I/O failure
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path of the failing store
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
    /// CSV-level failure
    #[error("CSV error at {path}: {source}")]
    Csv {
        /// Path of the failing store
        path: PathBuf,
        /// Underlying CSV failure
        #[source]
        source: csv::Error,
    },
    /// Workbook-level failure
    #[error("workbook error at {path}: {source}")]
    Workbook {
        /// Path of the failing store
        path: PathBuf,
        /// Underlying writer failure
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn workbook(path: &std::path::Path, source: rust_xlsxwriter::XlsxError) -> Self {
        Self::Workbook {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Outcome of one flush across all resolved destinations
///
/// A failure on one destination never prevents attempting the others, so
/// the report may be partial: some paths written, some failed. Failed
/// destinations are not retried within the flush; the next scheduled
/// flush attempts them again with the then-current buffer.
#[derive(Debug, Default)]
pub struct FlushReport {
    /// Readings appended to the raw store (0 when the buffer was empty
    /// or the primary append failed)
    pub rows_appended: usize,
    /// Destinations written successfully
    pub paths_written: Vec<PathBuf>,
    /// Destinations that failed, with the failure
    pub failures: Vec<(PathBuf, StoreError)>,
    /// Whether the buffer was drained (the primary raw append succeeded)
    pub buffer_cleared: bool,
}

impl FlushReport {
    /// At least one destination failed
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Every attempted destination was written
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_carries_path() {
        let err = StoreError::io(
            std::path::Path::new("/data/pressure_readings_2024-01-01.csv"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("pressure_readings_2024-01-01.csv"));
    }

    #[test]
    fn report_partiality() {
        let mut report = FlushReport::default();
        assert!(report.is_clean());

        report.failures.push((
            PathBuf::from("/mnt/usb/pressure_readings_2024-01-01.csv"),
            StoreError::io(
                std::path::Path::new("/mnt/usb/pressure_readings_2024-01-01.csv"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            ),
        ));
        assert!(report.is_partial());
    }
}
