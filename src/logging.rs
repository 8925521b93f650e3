use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;
use crate::settings::data_dir;

#[derive(Debug)]
struct FileLogger {
    log_file: PathBuf,
    level: Level,
}

static LOGGER: OnceCell<FileLogger> = OnceCell::new();

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} [{}] - {}\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );

            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

/// Installs the file logger under the data directory.
///
/// The TUI owns stdout, so every log line goes to `log.txt` instead.
pub fn init(debug: bool) -> Result<()> {
    let log_path = data_dir()?;
    create_dir_all(&log_path)?;

    let level = if debug { Level::Debug } else { Level::Info };
    let logger = LOGGER.get_or_init(|| FileLogger {
        log_file: log_path.join("log.txt"),
        level,
    });

    log::set_logger(logger)?;
    log::set_max_level(if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    static TEST_LOGGER: OnceCell<FileLogger> = OnceCell::new();

    #[test]
    fn writes_lines_and_reports_reinstall_as_app_error() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("log.txt");
        let logger = TEST_LOGGER.get_or_init(|| FileLogger {
            log_file: log_file.clone(),
            level: Level::Info,
        });

        log::set_logger(logger).unwrap();
        log::set_max_level(LevelFilter::Info);
        log::info!(target: "parley", "negotiation started");
        let written = std::fs::read_to_string(&log_file).unwrap();
        assert!(written.contains("INFO [parley] - negotiation started"));

        let err: AppError = log::set_logger(logger).unwrap_err().into();
        assert!(matches!(err, AppError::Logger(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
