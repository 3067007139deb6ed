//! Logging Infrastructure
//!
//! Console output always; with a log directory, a daily rotating file under
//! `<log_dir>/app` as well. Rotated files older than 14 days are removed by a
//! background sweep.

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "store";
const LOG_RETENTION_DAYS: i64 = 14;

/// Console logger at `info` (or `RUST_LOG`)
pub fn init_logger() -> anyhow::Result<()> {
    init_logger_with_file("info", false, None)
}

/// Initialize logging
///
/// * `level` - default filter when `RUST_LOG` is unset
/// * `json_format` - JSON lines instead of the human format (production)
/// * `log_dir` - enable the rotating file output
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            let app_log_dir = Path::new(dir).join("app");
            fs::create_dir_all(&app_log_dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, &app_log_dir, LOG_FILE_PREFIX);

            // Sweep needs a runtime; without one old files simply stay
            if tokio::runtime::Handle::try_current().is_ok() {
                tokio::spawn(periodic_cleanup(app_log_dir));
            }

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(appender))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}

/// Remove rotated `store.YYYY-MM-DD` files older than the retention window
///
/// Returns how many files were deleted.
pub fn cleanup_old_logs(app_log_dir: &Path, today: chrono::NaiveDate) -> anyhow::Result<usize> {
    let cutoff = today - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut removed = 0;
    if !app_log_dir.exists() {
        return Ok(removed);
    }

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(date_part) = name
            .strip_prefix(LOG_FILE_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }
    Ok(removed)
}

/// Hourly sweep of old log files
async fn periodic_cleanup(app_log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;
        let today = chrono::Local::now().date_naive();
        if let Err(e) = cleanup_old_logs(&app_log_dir, today) {
            tracing::warn!(error = %e, "Log cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["store.2024-01-01", "store.2024-03-10", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(cleanup_old_logs(dir.path(), today).unwrap(), 1);
        assert!(!dir.path().join("store.2024-01-01").exists());
        assert!(dir.path().join("store.2024-03-10").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
