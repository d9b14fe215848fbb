use slog::Logger;
use sloggers::Build;

/// Builds a terminal logger at `level` which writes to stderr.
pub fn build_terminal_logger(level: sloggers::types::Severity) -> Result<Logger, String> {
    sloggers::terminal::TerminalLoggerBuilder::new()
        .level(level)
        .destination(sloggers::terminal::Destination::Stderr)
        .build()
        .map_err(|e| format!("Unable to build terminal logger: {:?}", e))
}

/// Return a logger suitable for test usage.
///
/// By default no logs will be printed, but they can be enabled via the `test_logger` feature:
/// ```bash
/// $ cargo test -p execution_layer_stub --features 'logging/test_logger'
/// ```
/// If the `logging/test_logger` feature is not passed `test_logger()` will return a NullLogger
/// and no log information will be displayed.
pub fn test_logger() -> Logger {
    if cfg!(feature = "test_logger") {
        build_terminal_logger(sloggers::types::Severity::Debug).expect("Should build test_logger")
    } else {
        sloggers::null::NullLoggerBuilder
            .build()
            .expect("Should build null_logger")
    }
}
