//! Line source boundary
//!
//! The pipeline consumes its input as "a source that yields one line of
//! text at a time". Polling is non-blocking in the `nb` sense: a timeout
//! surfaces as `WouldBlock` and is not an error, so the loop keeps the
//! timeout-vs-fault distinction in the type rather than in sentinel
//! values. The serial implementation lives in the daemon; the core only
//! sees this trait.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::errors::TransportError;

/// Source of newline-delimited UTF-8 text lines
pub trait LineSource {
    /// Poll for the next line
    ///
    /// - `Ok(line)` — one line, trimmed of the newline; may be empty
    /// - `Err(nb::Error::WouldBlock)` — nothing available this tick
    /// - `Err(nb::Error::Other(_))` — transport fault
    fn poll_line(&mut self) -> nb::Result<String, TransportError>;
}

/// In-memory line source for tests and replay
///
/// Yields scripted lines in order, then `WouldBlock` until more are
/// pushed. Clones share the same queue, so a test can keep one handle to
/// feed lines while the session polls another.
#[derive(Debug, Clone, Default)]
pub struct MemoryLineSource {
    lines: Rc<RefCell<VecDeque<String>>>,
}

impl MemoryLineSource {
    /// Create a source from scripted lines
    pub fn new<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            lines: Rc::new(RefCell::new(lines.into_iter().map(Into::into).collect())),
        }
    }

    /// Queue one more line
    pub fn push(&self, line: impl Into<String>) {
        self.lines.borrow_mut().push_back(line.into());
    }

    /// Whether all scripted lines have been consumed
    pub fn is_exhausted(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl LineSource for MemoryLineSource {
    fn poll_line(&mut self) -> nb::Result<String, TransportError> {
        self.lines
            .borrow_mut()
            .pop_front()
            .ok_or(nb::Error::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_lines_then_would_block() {
        let mut source = MemoryLineSource::new(["P=1.0", "P=2.0"]);

        assert_eq!(source.poll_line().unwrap(), "P=1.0");
        assert_eq!(source.poll_line().unwrap(), "P=2.0");
        assert!(source.is_exhausted());
        assert!(matches!(source.poll_line(), Err(nb::Error::WouldBlock)));
    }

    #[test]
    fn clones_share_the_queue() {
        let mut source = MemoryLineSource::default();
        let feeder = source.clone();
        assert!(matches!(source.poll_line(), Err(nb::Error::WouldBlock)));

        feeder.push("P=3.5");
        assert_eq!(source.poll_line().unwrap(), "P=3.5");
    }
}
