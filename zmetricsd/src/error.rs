//! Hold error types for the metrics runner and related functionality.

use zmetrics_core::{CollectError, OutputError, RangeError};
use zmetrics_fetch::jsonrpsee::error::TransportError;

/// zmetricsd errors.
#[derive(Debug, thiserror::Error)]
pub enum MetricsdError {
    /// Configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// JSON RPSee connector errors.
    #[error("JSON RPSee connector error: {0}")]
    TransportError(#[from] TransportError),
    /// Invalid block height range, raised before any block is fetched.
    #[error("Range error: {0}")]
    RangeError(#[from] RangeError),
    /// Block fetch or metric errors.
    #[error("Collect error: {0}")]
    CollectError(#[from] CollectError),
    /// Report writing errors, including the output directory probe.
    #[error("Output error: {0}")]
    OutputError(#[from] OutputError),
}
