//! Utilities: logging setup.
//!
//! derive_level(-v count, -q) -> LogLevel
//! init_logging(level): tracing-subscriber fmt layer on stderr; RUST_LOG wins
//! when set.

use tracing_subscriber::EnvFilter;

/// Logging helpers.
pub mod logging {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "error",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        }

        /// Filter directive; dependencies stay at `warn` for info/debug.
        pub fn directive(&self) -> String {
            match self {
                LogLevel::Error => "error".to_string(),
                LogLevel::Trace => "trace".to_string(),
                other => format!("warn,sensu_runbook={}", other.as_str()),
            }
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn init_logging(level: LogLevel) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.directive()));
        // a second init (tests) is a no-op
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

#[cfg(test)]
mod tests {
    use super::logging::*;

    #[test]
    fn level_from_flags() {
        assert_eq!(derive_level(0, false), LogLevel::Info);
        assert_eq!(derive_level(1, false), LogLevel::Debug);
        assert_eq!(derive_level(5, false), LogLevel::Trace);
        assert_eq!(derive_level(2, true), LogLevel::Error);
    }

    #[test]
    fn directives() {
        assert_eq!(LogLevel::Info.directive(), "warn,sensu_runbook=info");
        assert_eq!(LogLevel::Trace.directive(), "trace");
        assert_eq!(LogLevel::Error.directive(), "error");
    }
}
