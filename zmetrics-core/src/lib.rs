//! Core of zmetrics: turns a range of Zcash block heights into per-block privacy metrics.
//!
//! The pipeline is strictly sequential:
//! [`range::HeightRange::resolve`] -> [`collector::collect_block_metrics`] -> [`output::write_json`].
//! HTML pages are written block by block instead, by handing [`output::write_html_page`] to
//! [`collector::collect_block_metrics_with`]. Every stage returns its error to the caller, nothing
//! is retried.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod collector;
pub mod error;
pub mod metric;
pub mod output;
pub mod range;
pub mod render;
pub mod source;

pub use classify::TransactionKind;
pub use collector::{collect_block_metrics, collect_block_metrics_with};
pub use error::{BlockSourceError, CollectError, OutputError, RangeError, TemplateError};
pub use metric::BlockMetric;
pub use output::{probe_output_dir, write_html_page, write_json, OutputConfig, OutputFormat};
pub use range::{HeightRange, RangeOptions, DEFAULT_NUM_BLOCKS};
pub use render::{BlockRenderer, HtmlTemplate};
pub use source::BlockSource;

#[cfg(test)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .try_init();
}
