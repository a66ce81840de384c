use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogLevel;

/// Initializes console logging at the configured verbosity.
///
/// The level becomes an explicit filter directive for this crate; NONE turns
/// the crate's output off rather than relying on ambient configuration.
/// Safe to call more than once; later calls are no-ops.
pub fn init(level: LogLevel) {
    let directive = match level {
        LogLevel::Debug => "agridata=debug",
        LogLevel::Info => "agridata=info",
        LogLevel::None => "agridata=off",
    };

    let filter = EnvFilter::from_default_env().add_directive(directive.parse().unwrap());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .try_init();
}
