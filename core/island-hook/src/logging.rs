//! Logging setup for island-hook.
//!
//! Stdout carries the answer the host reads back, so every log line goes to
//! stderr. `AI_ISLAND_DEBUG_LOG=1` raises the level to debug and also appends
//! to `~/.ai-island/logs/island-hook.<date>.log`.

use std::env;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEBUG_ENV: &str = "AI_ISLAND_DEBUG_LOG";
const FILTER_ENV: &str = "AI_ISLAND_LOG";
const LOG_DIR: &str = ".ai-island/logs";
const LOG_PREFIX: &str = "island-hook";

/// Installs the global subscriber. Hold the returned guard until exit so the
/// file writer flushes.
pub fn init() -> Option<WorkerGuard> {
    let debug_enabled = env::var(DEBUG_ENV).map(|v| is_truthy(&v)).unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match debug_enabled
        .then(dirs::home_dir)
        .flatten()
        .and_then(|home| file_writer(&home.join(LOG_DIR)))
    {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        ),
        None => (None, None),
    };

    // A subscriber may already be installed (tests); logging must never fail the hook.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}

fn file_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    fs_err::create_dir_all(dir).ok()?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .ok()?;
    Some(tracing_appender::non_blocking(appender))
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn file_writer_creates_log_dir() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested/logs");
        let writer = file_writer(&dir);
        assert!(writer.is_some());
        assert!(dir.is_dir());
    }
}
