use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::task;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Keeps the non-blocking file writer flushing until dropped.
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

/// Map a configured level to one `EnvFilter` understands, falling back to `info`.
pub fn normalize_level(level: &str) -> &str {
    if VALID_LEVELS.contains(&level) {
        level
    } else {
        "info"
    }
}

/// Install stdout and daily-rotated file layers. `RUST_LOG` overrides `level`.
///
/// Must be called from inside a tokio runtime: old log files are pruned by a
/// background task.
pub fn init_logging(log_dir: impl AsRef<Path>, prefix: &str, level: &str) -> Result<LoggerGuard> {
    let log_dir = log_dir.as_ref().to_path_buf();

    let effective = normalize_level(level);

    let builder = EnvFilter::builder().with_default_directive(
        effective
            .parse()
            .with_context(|| format!("Invalid log directive '{}'", effective))?,
    );

    let env_directives = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&env_directives);
    let file_filter = builder.parse_lossy(&env_directives);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create file appender")?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    if effective != level {
        tracing::warn!("Invalid log level '{}', defaulting to 'info'", level);
    }

    start_log_cleanup_task(log_dir, prefix.to_string());

    Ok(LoggerGuard(guard))
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String) {
    const MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 3);
    const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

    task::spawn(async move {
        loop {
            match cleanup_old_logs(&log_dir, &prefix, MAX_AGE) {
                Ok(removed) if removed > 0 => {
                    tracing::info!("Removed {} old log file(s) from {:?}", removed, log_dir)
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to delete old log file: {}", e),
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

/// Delete `<prefix>*.log` files in `log_dir` last modified more than `max_age` ago.
pub fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            tracing::debug!("Old log file deleted: {}", file_name);
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("debug"), "debug");
        assert_eq!(normalize_level("loud"), "info");
        assert_eq!(normalize_level(""), "info");
    }

    #[test]
    fn test_cleanup_only_touches_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let four_days_ago = SystemTime::now() - Duration::from_secs(60 * 60 * 24 * 4);
        for name in ["astro-backend.2026-01-01.log", "other.2026-01-01.log", "astro-backend.txt"] {
            let path = dir.join(name);
            fs::write(&path, "old").unwrap();
            fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(four_days_ago)
                .unwrap();
        }

        let removed =
            cleanup_old_logs(dir, "astro-backend", Duration::from_secs(60 * 60 * 24 * 3)).unwrap();

        assert_eq!(removed, 1);
        assert!(!dir.join("astro-backend.2026-01-01.log").exists());
        assert!(dir.join("other.2026-01-01.log").exists());
        assert!(dir.join("astro-backend.txt").exists());
    }

    #[test]
    fn test_cleanup_keeps_recent_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("astro-tracker.log"), "fresh").unwrap();

        let removed = cleanup_old_logs(dir, "astro-tracker", Duration::from_secs(3600)).unwrap();

        assert_eq!(removed, 0);
        assert!(dir.join("astro-tracker.log").exists());
    }
}
