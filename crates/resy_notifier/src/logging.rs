use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Where and how much to log
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Directory holding `resy_notifier.log` and `error.log`
    pub dir: PathBuf,
    /// `env_logger` filter directives for the console and the info log
    pub filter: String,
    /// Size at which a log file is rotated
    pub max_bytes: usize,
    /// Rotated files kept per log
    pub backups: usize,
}

impl LogSettings {
    /// Log file for everything below ERROR
    pub const INFO_LOG: &'static str = "resy_notifier.log";

    /// Log file for ERROR records
    pub const ERROR_LOG: &'static str = "error.log";

    /// `LOG_DIR` (default `logs`) and `RUST_LOG` (default `info`), 5 MiB x 5 backups
    pub fn from_env() -> Self {
        Self {
            dir: std::env::var("LOG_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .unwrap_or_else(|| "logs".to_string())
                .into(),
            filter: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_bytes: 5 * 1024 * 1024,
            backups: 5,
        }
    }
}

/// Sends each record to the console and to one of two rotating files.
///
/// ERROR records go to the error log, everything else that passes the
/// filter goes to the info log.
struct RoutingLogger {
    console: env_logger::Logger,
    info_file: env_logger::Logger,
    error_file: env_logger::Logger,
}

impl RoutingLogger {
    fn max_level(&self) -> LevelFilter {
        self.console
            .filter()
            .max(self.info_file.filter())
            .max(self.error_file.filter())
    }
}

impl Log for RoutingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata)
            || self.info_file.enabled(metadata)
            || self.error_file.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.console.log(record);

        if record.level() == Level::Error {
            self.error_file.log(record);
        } else {
            self.info_file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        self.info_file.flush();
        self.error_file.flush();
    }
}

fn rotating_file(path: PathBuf, settings: &LogSettings) -> FileRotate<AppendCount> {
    FileRotate::new(
        path,
        AppendCount::new(settings.backups),
        ContentLimit::Bytes(settings.max_bytes),
        Compression::None,
        None,
    )
}

fn build_logger(settings: &LogSettings) -> anyhow::Result<RoutingLogger> {
    ensure_dir(&settings.dir)?;

    let console = env_logger::Builder::new()
        .parse_filters(&settings.filter)
        .build();

    let info_file = env_logger::Builder::new()
        .parse_filters(&settings.filter)
        .target(env_logger::Target::Pipe(Box::new(rotating_file(
            settings.dir.join(LogSettings::INFO_LOG),
            settings,
        ))))
        .build();

    let error_file = env_logger::Builder::new()
        .filter_level(LevelFilter::Error)
        .target(env_logger::Target::Pipe(Box::new(rotating_file(
            settings.dir.join(LogSettings::ERROR_LOG),
            settings,
        ))))
        .build();

    Ok(RoutingLogger {
        console,
        info_file,
        error_file,
    })
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))
}

/// Install the console and rotating file logger
pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let logger = build_logger(settings)?;
    let max_level = logger.max_level();

    log::set_boxed_logger(Box::new(logger)).context("Failed to initialise logger")?;
    log::set_max_level(max_level);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dir: &Path, max_bytes: usize) -> LogSettings {
        LogSettings {
            dir: dir.join("logs"),
            filter: "info".to_string(),
            max_bytes,
            backups: 5,
        }
    }

    fn emit(logger: &RoutingLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("resy_notifier")
                .args(format_args!("{}", message))
                .build(),
        );
        logger.flush();
    }

    fn read(settings: &LogSettings, name: &str) -> String {
        fs::read_to_string(settings.dir.join(name)).unwrap_or_default()
    }

    #[test]
    fn test_errors_are_split_from_info() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path(), 1024 * 1024);
        let logger = build_logger(&settings).unwrap();

        emit(&logger, Level::Info, "polling venue");
        emit(&logger, Level::Warn, "slow response");
        emit(&logger, Level::Error, "relay refused");
        emit(&logger, Level::Debug, "filtered out");

        let info = read(&settings, LogSettings::INFO_LOG);
        let errors = read(&settings, LogSettings::ERROR_LOG);

        assert!(info.contains("polling venue"));
        assert!(info.contains("slow response"));
        assert!(!info.contains("relay refused"));
        assert!(!info.contains("filtered out"));

        assert!(errors.contains("relay refused"));
        assert!(!errors.contains("polling venue"));
    }

    #[test]
    fn test_info_log_rotates_by_size() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = settings(tmp.path(), 64);
        let logger = build_logger(&settings).unwrap();

        for i in 0..10 {
            emit(&logger, Level::Info, &format!("poll number {}", i));
        }

        assert!(settings.dir.join("resy_notifier.log.1").exists());
    }

    #[test]
    fn test_max_level_follows_filter() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = settings(tmp.path(), 1024);
        settings.filter = "warn".to_string();

        let logger = build_logger(&settings).unwrap();

        assert_eq!(logger.max_level(), LevelFilter::Warn);
    }
}
