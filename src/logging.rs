use std::io;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

/// Installs a plain stdout subscriber at `INFO`. The core itself never decides where a run's
/// logs end up — that's the surrounding service's concern — so this is only ever used by
/// binaries embedding the core directly and by tests.
pub fn init_std_out_logging() {
    let collector = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(io::stdout)
            .with_filter(LevelFilter::INFO),
    );
    let _ = tracing::subscriber::set_global_default(collector);
}

/// Installs a subscriber that writes JSON-formatted `INFO` logs to a non-rolling file under
/// `directory` in addition to stdout. The returned `WorkerGuard` must be kept alive for the
/// duration of the run — dropping it flushes the non-blocking writer's queue and stops
/// accepting new log lines. For binaries that embed this core directly and want a log file
/// alongside the kernel's own output, not used by the core's own modules.
pub fn init_file_and_std_out_logging(directory: &Path, file_name: &str) -> WorkerGuard {
    let appender = rolling::never(directory, file_name);
    let (file_writer, guard) = non_blocking(appender);

    let collector = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(file_writer)
                .json()
                .with_ansi(false)
                .with_filter(LevelFilter::INFO),
        )
        .with(
            fmt::Layer::new()
                .with_writer(io::stdout)
                .with_filter(LevelFilter::INFO),
        );
    let _ = tracing::subscriber::set_global_default(collector);
    guard
}
