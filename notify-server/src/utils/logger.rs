//! Logging Infrastructure
//!
//! Structured logging with an `EnvFilter`, optional JSON output and an
//! optional daily rolling file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// 日志文件名前缀 (滚动后缀为日期)
pub const LOG_FILE_PREFIX: &str = "notify-server";

/// Initialize the logger (stdout, info level)
pub fn init_logger() -> anyhow::Result<()> {
    init_logger_with_file(None, false, None).map(|_| ())
}

/// Initialize the logger with optional file output
///
/// `log_level` accepts any `EnvFilter` directive (`info`, `notify_server=debug,tower_http=info`).
/// When `log_dir` is set the directory is created and logs go to a daily
/// rolling file; keep the returned guard alive until shutdown.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logger_writes_rolling_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let guard = init_logger_with_file(Some("info"), true, Some(log_dir.as_path())).unwrap();
        assert!(guard.is_some());
        tracing::info!(shipment_id = "s-1", "logger smoke test");
        drop(guard);

        let files: Vec<_> = std::fs::read_dir(&log_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(files.iter().any(|f| f.starts_with(LOG_FILE_PREFIX)));

        // A second install is refused instead of panicking
        assert!(init_logger().is_err());
    }
}
