use crate::config;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber.
///
/// Logs go to `logs/<log_file>` (rotated daily). When `LOG_TO_STDOUT=true`
/// they are mirrored to stdout as well. The filter comes from `LOG_LEVEL`
/// and falls back to `default_filter`, see [`filter_directives`].
///
/// Keep the returned guard alive for the lifetime of the process, otherwise
/// buffered lines are lost on exit.
pub fn init_logging(log_file: &str, default_filter: &str) -> WorkerGuard {
    std::fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(true)
    });

    let env_filter = EnvFilter::new(filter_directives(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

/// `LOG_LEVEL` when configured, otherwise the binary's own default.
pub fn filter_directives(default_filter: &str) -> String {
    config::log_level().unwrap_or_else(|| default_filter.to_string())
}
