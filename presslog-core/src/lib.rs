//! Ingestion, aggregation, and persistence pipeline for presslog
//!
//! Continuously ingests `P=<value>` pressure readings from a line-based
//! transport, buffers them, and persists them in two complementary forms:
//! an append-only daily CSV and a charted per-minute-average workbook.
//! Output rotates at midnight and is mirrored to removable media when a
//! mount point is present.
//!
//! The pipeline is single-threaded and cooperative; all state lives in a
//! [`Session`] driven by [`Session::tick`] or [`Session::run`].
//!
//! ```no_run
//! use presslog_core::{LoggerConfig, MediaScan, MemoryLineSource, Session, SystemClock};
//!
//! let config = LoggerConfig::default();
//! let mounts = MediaScan::new(config.media_roots.clone());
//! let source = MemoryLineSource::new(["P=2.75"]);
//!
//! let mut session = Session::new(config, SystemClock, source, mounts)?;
//! session.tick();
//! session.finish();
//! # Ok::<(), presslog_core::StoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod dest;
pub mod errors;
pub mod reading;
pub mod session;
pub mod store;
pub mod transport;

// Public API
pub use aggregate::{minute_averages, MinuteRow};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LoggerConfig;
pub use dest::{DestinationSet, MediaScan, MountProvider, StaticMounts, StoreRole};
pub use errors::{FlushReport, StoreError, TransportError};
pub use reading::{parse_line, ParseRejection, Reading};
pub use session::Session;
pub use transport::{LineSource, MemoryLineSource};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
