//! The logging session: rotation, scheduling, and persistence
//!
//! A [`Session`] owns all mutable pipeline state and cycles through a
//! single-threaded cooperative loop: rotation check, one transport poll,
//! buffering, and a conditional flush. There are no ambient globals and
//! no locks; the only suspension points are the transport's bounded read
//! timeout and the bounded sleep between iterations.
//!
//! ## Flush protocol
//!
//! Buffered readings are appended to every resolved raw path; the buffer
//! is cleared only when the primary append succeeded, so data captured by
//! the canonical store is never silently lost even if a mirror write
//! fails. The minute table is then recomputed once from the full day
//! history and the workbook rewritten at every aggregate path. Failures
//! are collected per path and reported, never retried within the flush.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::Duration;
use log::{error, info, warn};

use crate::aggregate::minute_averages;
use crate::clock::Clock;
use crate::config::LoggerConfig;
use crate::dest::{DestinationSet, MountProvider, StoreRole};
use crate::errors::{FlushReport, StoreError};
use crate::reading::{parse_line, Reading};
use crate::store;
use crate::transport::LineSource;

/// One day's worth of logging state, driven by [`Session::tick`]
pub struct Session<C: Clock, S: LineSource, M: MountProvider> {
    config: LoggerConfig,
    clock: C,
    source: S,
    mounts: M,
    dest: DestinationSet,
    active_day: String,
    /// Readings parsed since the last successful flush
    buffer: Vec<Reading>,
    /// Full raw history of the active day, source of the aggregate rewrite
    day_rows: Vec<Reading>,
    /// Whether the workbook lags behind `day_rows`
    aggregate_dirty: bool,
    last_flush: chrono::NaiveDateTime,
}

impl<C: Clock, S: LineSource, M: MountProvider> Session<C, S, M> {
    /// Open a session for the current day
    ///
    /// Resolves destinations, idempotently initializes the day's stores,
    /// and seeds the day table from the primary CSV so a same-day restart
    /// continues where it left off. Fails only when the primary stores
    /// cannot be initialized; mirror failures are logged and the mirror
    /// is skipped.
    pub fn new(config: LoggerConfig, clock: C, source: S, mounts: M) -> Result<Self, StoreError> {
        let now = clock.now();
        let today = clock.today();

        let dest = DestinationSet::resolve(&config, &today, &mounts);
        init_stores(&dest)?;
        let day_rows = store::csv::read_day(dest.primary(StoreRole::Raw))?;

        info!(
            "logging day {} to {}",
            today,
            dest.primary(StoreRole::Raw).display()
        );
        if dest.has_mirror() {
            info!("mirroring to {}", dest.paths(StoreRole::Raw)[1].display());
        }

        Ok(Self {
            config,
            clock,
            source,
            mounts,
            dest,
            active_day: today,
            buffer: Vec::new(),
            aggregate_dirty: !day_rows.is_empty(),
            day_rows,
            last_flush: now,
        })
    }

    /// One loop iteration: rotation check, poll, buffer, conditional flush
    ///
    /// Returns the report when a flush ran. Faults inside the iteration
    /// are logged and contained; the loop is meant to keep running.
    pub fn tick(&mut self) -> Option<FlushReport> {
        if let Err(e) = self.rotate_if_needed() {
            error!("rotation failed, staying on day {}: {}", self.active_day, e);
        }

        match self.source.poll_line() {
            Ok(line) if !line.is_empty() => match parse_line(&line, self.clock.now()) {
                Ok(reading) => {
                    info!("{} -> {:.2} bar", reading.timestamp, reading.value);
                    self.buffer.push(reading);
                }
                Err(rejection) => warn!("invalid data {:?}: {}", line, rejection),
            },
            Ok(_) => {}
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(e)) => error!("transport fault: {}", e),
        }

        if !self.buffer.is_empty() && self.flush_due() {
            let report = self.flush();
            if report.rows_appended > 0 {
                info!("saved {} readings and updated chart", report.rows_appended);
            }
            return Some(report);
        }
        None
    }

    /// Drive the loop until `shutdown` is raised, then flush once more
    ///
    /// The flag is observed between iterations, so an interrupt arriving
    /// mid-sleep still gets its final flush before the method returns.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::SeqCst) {
            self.tick();
            thread::sleep(self.config.tick_sleep);
        }
        info!("stopping logger");
        self.finish();
    }

    /// Final forced flush for orderly shutdown
    ///
    /// A failure here is logged and swallowed; everything durably written
    /// up to the last successful flush is preserved, and losing the
    /// in-flight buffer on a failing final flush is the accepted risk.
    pub fn finish(&mut self) -> FlushReport {
        let pending = self.buffer.len();
        let report = self.flush();
        if pending > 0 {
            if report.buffer_cleared {
                info!("saved {} readings before exit and updated chart", pending);
            } else {
                error!("final flush failed; {} buffered readings lost", pending);
            }
        }
        report
    }

    /// Flush the buffer and rewrite the aggregate stores now
    ///
    /// Called on the scheduled cadence, on rotation, and on shutdown.
    /// An empty buffer skips the raw append, and the workbook rewrite is
    /// skipped too when nothing changed since the last successful write.
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();

        if !self.buffer.is_empty() {
            let mut primary_ok = false;
            for (i, path) in self.dest.paths(StoreRole::Raw).iter().enumerate() {
                match store::csv::append(path, &self.buffer) {
                    Ok(()) => {
                        if i == 0 {
                            primary_ok = true;
                        }
                        report.paths_written.push(path.clone());
                    }
                    Err(e) => {
                        error!("raw write failed for {}: {}", path.display(), e);
                        report.failures.push((path.clone(), e));
                    }
                }
            }
            if primary_ok {
                report.rows_appended = self.buffer.len();
                report.buffer_cleared = true;
                self.day_rows.append(&mut self.buffer);
                self.aggregate_dirty = true;
            }
        }

        if self.aggregate_dirty {
            let minutes = minute_averages(&self.day_rows);
            for (i, path) in self.dest.paths(StoreRole::Aggregate).iter().enumerate() {
                match store::workbook::write(path, &self.day_rows, &minutes) {
                    Ok(()) => {
                        if i == 0 {
                            self.aggregate_dirty = false;
                        }
                        report.paths_written.push(path.clone());
                    }
                    Err(e) => {
                        error!("workbook write failed for {}: {}", path.display(), e);
                        report.failures.push((path.clone(), e));
                    }
                }
            }
        }

        if report.buffer_cleared {
            self.last_flush = self.clock.now();
        }
        report
    }

    /// Number of readings waiting for the next flush
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// The calendar day the session is currently writing
    pub fn active_day(&self) -> &str {
        &self.active_day
    }

    /// The destinations resolved for the active day
    pub fn destinations(&self) -> &DestinationSet {
        &self.dest
    }

    fn flush_due(&self) -> bool {
        let elapsed = self.clock.now().signed_duration_since(self.last_flush);
        elapsed >= Duration::seconds(self.config.save_interval_secs as i64)
    }

    /// Close the outgoing day and open today's stores if the date changed
    ///
    /// The outgoing flush runs against the old destinations before
    /// anything is re-resolved, so no reading crosses the day boundary.
    /// On error the transition is aborted and retried next tick.
    fn rotate_if_needed(&mut self) -> Result<bool, StoreError> {
        let today = self.clock.today();
        if today == self.active_day {
            return Ok(false);
        }

        info!("switching to new daily logs for {}", today);
        self.flush();

        let dest = DestinationSet::resolve(&self.config, &today, &self.mounts);
        init_stores(&dest)?;
        let day_rows = store::csv::read_day(dest.primary(StoreRole::Raw))?;

        self.aggregate_dirty = !day_rows.is_empty();
        self.day_rows = day_rows;
        self.dest = dest;
        self.active_day = today;
        Ok(true)
    }
}

/// Initialize both stores at every resolved path
///
/// A primary failure is fatal to the caller; mirror failures are logged
/// and the path left for the flush to report again.
fn init_stores(dest: &DestinationSet) -> Result<(), StoreError> {
    for role in [StoreRole::Raw, StoreRole::Aggregate] {
        for (i, path) in dest.paths(role).iter().enumerate() {
            let result = match role {
                StoreRole::Raw => store::csv::init(path),
                StoreRole::Aggregate => store::workbook::init(path),
            };
            match result {
                Ok(()) => {}
                Err(e) if i == 0 => return Err(e),
                Err(e) => error!("mirror init failed for {}: {}", path.display(), e),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dest::StaticMounts;
    use crate::transport::MemoryLineSource;
    use chrono::NaiveDate;

    fn start() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn session_in(
        dir: &std::path::Path,
        clock: ManualClock,
        lines: &[&str],
    ) -> Session<ManualClock, MemoryLineSource, StaticMounts> {
        let config = LoggerConfig {
            data_dir: dir.to_path_buf(),
            ..LoggerConfig::default()
        };
        let source = MemoryLineSource::new(lines.iter().copied());
        Session::new(config, clock, source, StaticMounts::default()).unwrap()
    }

    #[test]
    fn buffers_until_interval_elapses() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new(start());
        let mut session = session_in(dir.path(), clock.clone(), &["P=1.0", "P=2.0"]);

        assert!(session.tick().is_none());
        assert!(session.tick().is_none());
        assert_eq!(session.pending(), 2);

        clock.advance(Duration::seconds(10));
        let report = session.tick().expect("flush due");
        assert_eq!(report.rows_appended, 2);
        assert!(report.is_clean());
        assert_eq!(session.pending(), 0);
    }

    #[test]
    fn empty_buffer_is_never_flushed_on_cadence() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new(start());
        let mut session = session_in(dir.path(), clock.clone(), &[]);

        clock.advance(Duration::seconds(60));
        assert!(session.tick().is_none());
    }

    #[test]
    fn rejected_lines_do_not_reach_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new(start());
        let mut session = session_in(dir.path(), clock.clone(), &["garbage", "P=x", "P=1.5"]);

        session.tick();
        session.tick();
        session.tick();
        assert_eq!(session.pending(), 1);
    }

    #[test]
    fn failed_primary_retains_buffer_for_retry() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new(start());
        let mut session = session_in(dir.path(), clock.clone(), &["P=1.0"]);

        session.tick();
        // Make the primary append fail by replacing the file with a directory.
        let primary = session.destinations().primary(StoreRole::Raw).to_path_buf();
        std::fs::remove_file(&primary).unwrap();
        std::fs::create_dir(&primary).unwrap();

        clock.advance(Duration::seconds(10));
        let report = session.tick().expect("flush attempted");
        assert!(report.is_partial());
        assert!(!report.buffer_cleared);
        assert_eq!(session.pending(), 1);
    }
}
