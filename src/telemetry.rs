use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

/// Daily rolling file log for the server. Keep the guard alive for the
/// lifetime of the process or buffered lines are lost.
pub fn init_file_logging(log_dir: &str) -> WorkerGuard {
    let file_appender = rolling::daily(log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    guard
}

/// Console logging for batch jobs. Goes to stderr so stdout carries only the
/// job's own report.
pub fn init_console_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .compact()
        .init();
}
