//! Wall-clock abstraction
//!
//! The pipeline stamps readings and decides rotation from local wall time.
//! Keeping the clock behind a trait lets tests drive rotation and flush
//! cadence deterministically without sleeping.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Duration, Local, NaiveDateTime};

/// Format used for reading timestamps (second precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for daily file names and rotation checks
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Source of local wall-clock time
pub trait Clock {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;

    /// Current time formatted with second precision
    fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Current calendar date, the rotation unit
    fn today(&self) -> String {
        self.now().format(DAY_FORMAT).to_string()
    }
}

/// System clock reading local time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock for testing
///
/// Clones share the same underlying instant, so a test can keep one handle
/// and advance time while the session holds another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: NaiveDateTime) {
        self.now.set(instant);
    }

    /// Move time forward (or backward, with a negative duration)
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}
