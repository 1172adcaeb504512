//! Logger utility for transfer logging
//!
//! Provides a file logger that works alongside the standard log crate, and a
//! helper that installs `env_logger` for callers who configure logging through
//! `RUST_LOG` instead.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

/// File logger
pub struct Logger {
    /// File handle for log output
    file: Mutex<Option<File>>,
    level: LevelFilter,
}

impl Logger {
    /// Creates a logger writing to `log_file`, truncating it
    pub fn new(log_file: &Path, level: LevelFilter) -> io::Result<Self> {
        let file = File::create(log_file)?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            level,
        })
    }

    /// Writes one line to the log file
    pub fn write_line(&self, message: &str) -> io::Result<()> {
        // A panic while holding the lock leaves the file usable
        let mut guard = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Installs a file logger as the global logger
    ///
    /// Returns `false` when a global logger was already installed, in which
    /// case the existing one stays in place.
    pub fn init_global_logger(log_file: &Path, level: LevelFilter) -> io::Result<bool> {
        let global_logger = Logger::new(log_file, level)?;

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
            return Ok(false);
        }

        log::set_max_level(level);
        Ok(true)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            let _ = self.write_line(&message);
        }
    }

    fn flush(&self) {
        // Already flushing in write_line
    }
}

/// Installs `env_logger`, defaulting to `level` when `RUST_LOG` is unset
///
/// Returns `false` when a global logger was already installed.
pub fn init_env_logger(level: LevelFilter) -> bool {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .is_ok()
}
