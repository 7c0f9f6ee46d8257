//! zmetricsd: collects per-block transaction privacy metrics from a Zcash node.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod runner;

use tracing::warn;
use tracing_subscriber::{fmt::time::UtcTime, EnvFilter};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set, otherwise `log_level` is used. An invalid `log_level` is reported
/// and replaced by `info`.
pub fn init_logging(log_level: &str) {
    let (filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(log_filter_directive(log_level)) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new("info"), Some(e)),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(true)
        .try_init();

    if let Some(e) = rejected {
        warn!("Invalid log-level '{log_level}' ({e}), logging at info");
    }
}

/// Turns a configured log level into a filter directive.
///
/// Numbers use the logrus scale older zmetrics configs were written for: 0 to 2 log errors only,
/// 3 warn, 4 info, 5 debug, 6 and above trace. Anything else is passed through as a directive.
pub fn log_filter_directive(log_level: &str) -> String {
    match log_level.trim().parse::<u64>() {
        Ok(0..=2) => "error".to_string(),
        Ok(3) => "warn".to_string(),
        Ok(4) => "info".to_string(),
        Ok(5) => "debug".to_string(),
        Ok(_) => "trace".to_string(),
        Err(_) => log_level.to_string(),
    }
}
