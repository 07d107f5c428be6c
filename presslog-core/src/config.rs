//! Runtime configuration for the logging pipeline
//!
//! Defaults mirror the deployment this logger was built for: a sensor on
//! `/dev/ttyS0` at 9600 baud, persisted every 10 seconds into daily files
//! named `pressure_readings_<date>.{csv,xlsx}`.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a logging session
///
/// Construct with [`LoggerConfig::default`] and override individual fields,
/// or let the daemon's CLI layer fill it in.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Serial device the daemon reads from
    pub port: String,
    /// Serial communication speed
    pub baud_rate: u32,
    /// Directory receiving the primary daily files
    pub data_dir: PathBuf,
    /// Base name for daily files (`<prefix>_<date>.<ext>`)
    pub file_prefix: String,
    /// Seconds between scheduled flushes
    pub save_interval_secs: u64,
    /// Sleep between loop iterations; caps CPU while staying responsive
    pub tick_sleep: Duration,
    /// Roots scanned for removable-media mount points (`<root>/<user>/<label>`)
    pub media_roots: Vec<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyS0".into(),
            baud_rate: 9600,
            data_dir: PathBuf::from("."),
            file_prefix: "pressure_readings".into(),
            save_interval_secs: 10,
            tick_sleep: Duration::from_millis(100),
            media_roots: vec![PathBuf::from("/media"), PathBuf::from("/run/media")],
        }
    }
}
