use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_DIR_ENV: &str = "BUGEX_LOG_DIR";
const DEFAULT_DIRECTIVES: &str = "bugex_core=info,bugex_cli=info,warn";

/// Directory holding the rolling log files, `BUGEX_LOG_DIR` wins over `~/.bugex/logs`.
pub fn log_dir() -> PathBuf {
    match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bugex")
            .join("logs"),
    }
}

/// `RUST_LOG` overrides the default directives.
fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Installs the global subscriber: a daily file under [`log_dir`] named after
/// `component`, plus stderr when `to_stderr` is set.
///
/// A subscriber installed earlier stays in place. Keep the guard alive until
/// exit so buffered lines reach the file.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let dir = log_dir();
    let _ = std::fs::create_dir_all(&dir);

    // cli.log.2026-10-16
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, component));

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });

    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    guard
}
