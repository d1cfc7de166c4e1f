//! Debug logging for ridilint
//!
//! A file logger for tracing what a lint invocation did: argument sniffing,
//! parse, entity counts, rule filtering and the merge step. Off unless a
//! log file is configured; never writes to the output streams the emulated
//! phpcs contract owns.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Global logger instance
static LOGGER: Mutex<Option<LintLogger>> = Mutex::new(None);

struct LintLogger {
    file: File,
}

impl LintLogger {
    fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Self { file })
    }

    fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }
}

/// Initialize the global logger.
pub fn init(log_path: &Path) -> std::io::Result<()> {
    let logger = LintLogger::new(log_path)?;
    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }
    Ok(())
}

/// Log a message to the global logger; no-op when logging is off.
pub fn log(message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(message);
        }
    }
}

/// Log a section header for an invocation phase.
pub fn section(title: &str) {
    log(&"=".repeat(60));
    log(title);
    log(&"=".repeat(60));
}
