//! Serial transport for the pipeline's line source boundary
//!
//! Wraps a UART handle behind [`LineSource`] so the core never sees the
//! serial crate. A read timeout surfaces as `WouldBlock`; bytes received
//! before the timeout are kept so a line split across reads is completed
//! on a later poll.

use std::io::{self, Read};
use std::time::Duration;

use presslog_core::{LineSource, TransportError};
use serialport::SerialPort;

/// UART-backed line source
pub struct SerialLineSource {
    port: Box<dyn SerialPort>,
    /// Bytes of a line still waiting for its newline
    partial: Vec<u8>,
    chunk: [u8; 256],
}

impl SerialLineSource {
    /// Open the port with the given read timeout
    pub fn open(port: &str, baud_rate: u32, timeout: Duration) -> Result<Self, TransportError> {
        let handle = serialport::new(port, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|e| TransportError::Open {
                port: port.to_string(),
                source: e.into(),
            })?;
        Ok(Self {
            port: handle,
            partial: Vec::new(),
            chunk: [0; 256],
        })
    }

    fn take_line(&mut self, newline: usize) -> String {
        let rest = self.partial.split_off(newline + 1);
        let line = String::from_utf8_lossy(&self.partial[..newline])
            .trim()
            .to_string();
        self.partial = rest;
        line
    }
}

impl LineSource for SerialLineSource {
    fn poll_line(&mut self) -> nb::Result<String, TransportError> {
        // A complete line may already be buffered from a previous read.
        if let Some(newline) = self.partial.iter().position(|&b| b == b'\n') {
            return Ok(self.take_line(newline));
        }

        match self.port.read(&mut self.chunk) {
            Ok(0) => Err(nb::Error::WouldBlock),
            Ok(n) => {
                self.partial.extend_from_slice(&self.chunk[..n]);
                match self.partial.iter().position(|&b| b == b'\n') {
                    Some(newline) => Ok(self.take_line(newline)),
                    None => Err(nb::Error::WouldBlock),
                }
            }
            Err(e)
                if e.kind() == io::ErrorKind::TimedOut
                    || e.kind() == io::ErrorKind::WouldBlock =>
            {
                Err(nb::Error::WouldBlock)
            }
            Err(e) => Err(nb::Error::Other(TransportError::Read(e))),
        }
    }
}
