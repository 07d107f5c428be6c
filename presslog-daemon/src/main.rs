//! UART pressure logging daemon
//!
//! Reads `P=<value>` lines from a serial port and persists them as a
//! daily CSV plus a charted minute-average workbook, mirrored to
//! removable media when present. Ctrl+C triggers an orderly shutdown
//! with one final flush; unrecoverable startup failures exit non-zero.

use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use presslog_core::{LoggerConfig, MediaScan, Session, SystemClock};

mod serial;

use serial::SerialLineSource;

/// Read timeout on the serial port; maps to "no input this tick"
const READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "presslog", version, about = "UART pressure logger with minute-averaged chart")]
struct Cli {
    /// Serial device to read from
    #[arg(long, default_value = "/dev/ttyS0")]
    port: String,

    /// Serial communication speed
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Directory receiving the daily log files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Seconds between scheduled flushes
    #[arg(long, default_value_t = 10)]
    save_interval: u64,

    /// Base name for daily files
    #[arg(long, default_value = "pressure_readings")]
    prefix: String,

    /// Removable-media roots to scan for a mirror (repeatable)
    #[arg(long = "media-root", default_values_os_t = [PathBuf::from("/media"), PathBuf::from("/run/media")])]
    media_roots: Vec<PathBuf>,
}

impl Cli {
    fn into_config(self) -> LoggerConfig {
        LoggerConfig {
            port: self.port,
            baud_rate: self.baud,
            data_dir: self.data_dir,
            file_prefix: self.prefix,
            save_interval_secs: self.save_interval,
            media_roots: self.media_roots,
            ..LoggerConfig::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.into_config();

    info!("starting UART sensor logger; press Ctrl+C to stop");
    let source = SerialLineSource::open(&config.port, config.baud_rate, READ_TIMEOUT)?;
    let mounts = MediaScan::new(config.media_roots.clone());

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    let mut session = Session::new(config, SystemClock, source, mounts)?;
    session.run(&shutdown);
    Ok(())
}
