//! Diagnostic logging.
//!
//! Uses the `tracing` ecosystem with a stderr `fmt` layer. User-facing
//! errors are printed by the console with an `Error: ` prefix; these logs
//! are for diagnosing what the tool did and are quiet (`warn`) by default.
//!
//! Level resolution, first match wins: `--log-level`, `--verbose`,
//! `SCOPE_REPARENT_LOG_LEVEL`, the config file's `log_level`, then `warn`.
//! `RUST_LOG` replaces the whole filter when set.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants;

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Parse a level name, case-insensitively.
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Pick the effective level from the CLI flag, verbosity, environment and
/// config value.
///
/// An unparseable value is skipped in favour of the next source.
pub fn resolve_level(
    cli_level: Option<&str>,
    verbose: bool,
    env_level: Option<&str>,
    config_level: Option<&str>,
) -> Level {
    if let Some(level) = cli_level.and_then(parse_level) {
        return level;
    }
    if verbose {
        return Level::DEBUG;
    }
    env_level
        .and_then(parse_level)
        .or_else(|| config_level.and_then(parse_level))
        .or_else(|| parse_level(constants::DEFAULT_LOG_LEVEL))
        .unwrap_or(Level::WARN)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: Level) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("scope_reparent={level}"))
        };

        // A subscriber may already be installed (e.g. by a test harness).
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init();
    });
}
