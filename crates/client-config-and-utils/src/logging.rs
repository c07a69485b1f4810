//! Logging initialization.
//!
//! Every crate logs through `tracing` macros; binaries call [`init_logging`]
//! once at startup. `RUST_LOG` takes precedence over the configured level.
//! Set `MOODLOG_LOG_FORMAT=json` for one JSON object per line.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(normalize(level)));

    let json = std::env::var("MOODLOG_LOG_FORMAT")
        .map(|format| format.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .finish()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .finish()
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

fn normalize(level: &str) -> &'static str {
    match parse_level(level) {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_all_variants() {
        assert_eq!(parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("info"), tracing::Level::INFO);
        assert_eq!(parse_level("warn"), tracing::Level::WARN);
        assert_eq!(parse_level("warning"), tracing::Level::WARN);
        assert_eq!(parse_level("error"), tracing::Level::ERROR);
    }

    #[test]
    fn parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), tracing::Level::TRACE);
        assert_eq!(parse_level("Warning"), tracing::Level::WARN);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("verbose"), tracing::Level::INFO);
        assert_eq!(normalize("nonsense"), "info");
        assert_eq!(normalize("WARNING"), "warn");
    }

    #[test]
    fn init_logging_twice_does_not_panic() {
        init_logging("debug");
        init_logging("info");
    }
}
