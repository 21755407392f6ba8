//! File logger behind the `log` facade.
//!
//! Controlled by the TAB_TALLY_LOG environment variable:
//! - 0, `off` or unset: No logging
//! - 1 or `error`: Errors only (warnings included)
//! - 2 or `info`: Lifecycle events
//! - 3 or `debug`: Fit results, cache misses
//! - 4 or `trace`: Every search step and tab event
//!
//! Output goes to `tab_tally.log` in the system temp directory. When
//! RUST_LOG is set, records are mirrored to stderr as well.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Environment variable selecting the log level.
pub const LEVEL_ENV: &str = "TAB_TALLY_LOG";

/// Parse a TAB_TALLY_LOG value.
pub fn parse_level(value: &str) -> LevelFilter {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "error" | "warn" => LevelFilter::Warn,
        "2" | "info" => LevelFilter::Info,
        "3" | "debug" => LevelFilter::Debug,
        "4" | "trace" => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

fn level_from_env() -> LevelFilter {
    std::env::var(LEVEL_ENV)
        .map(|value| parse_level(&value))
        .unwrap_or(LevelFilter::Off)
}

/// Where the log file is written.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("tab_tally.log")
}

struct FileLogger {
    level: LevelFilter,
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<FileLogger> = OnceLock::new();

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Install the logger. Embedders call this once at startup.
///
/// Returns the active level. The level is read from the environment on the
/// first call only; repeated calls (and processes that already installed
/// another logger) are no-ops.
pub fn init() -> LevelFilter {
    let level = level_from_env();
    let logger = LOGGER.get_or_init(|| {
        let file = if level == LevelFilter::Off {
            None
        } else {
            // A missing log file must not stop the counter.
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_path())
                .ok()
        };
        FileLogger {
            level,
            file: Mutex::new(file),
            mirror_stderr: std::env::var_os("RUST_LOG").is_some(),
        }
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
        log::info!(
            "tab-tally {} logging started (level={})",
            env!("CARGO_PKG_VERSION"),
            logger.level
        );
    }
    logger.level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_numbers_and_names() {
        assert_eq!(parse_level("0"), LevelFilter::Off);
        assert_eq!(parse_level("1"), LevelFilter::Warn);
        assert_eq!(parse_level(" 2 "), LevelFilter::Info);
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("trace"), LevelFilter::Trace);
        assert_eq!(parse_level("verbose"), LevelFilter::Off);
    }

    #[test]
    fn test_init_is_idempotent() {
        let level = init();
        assert_eq!(log::max_level(), level);
        assert_eq!(init(), level);
        assert_eq!(log::max_level(), level);
    }

    #[test]
    fn test_log_path_in_temp_dir() {
        assert!(log_path().starts_with(std::env::temp_dir()));
        assert_eq!(log_path().file_name().unwrap(), "tab_tally.log");
    }
}
