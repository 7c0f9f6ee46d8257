//! Holds error types for zmetrics-core.

use std::path::PathBuf;

/// An error originating from a block source.
#[derive(Debug, thiserror::Error)]
pub enum BlockSourceError {
    /// The node does not have a block at this height in its best chain.
    #[error("block at height {0} is not in the node's best chain")]
    MissingBlock(u32),

    /// Transport, authentication or node side failure.
    #[error("critical error in backing block source: {0}")]
    Unrecoverable(String),
}

/// Errors raised while resolving the height range. No block has been fetched when these occur.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    /// The chain height query needed for an unset start height failed.
    #[error("failed to query current chain height: {0}")]
    ChainQuery(#[source] BlockSourceError),

    /// The resolved end height lies after the start height.
    #[error("end height {end} after start height {start}")]
    EndAfterStart {
        /// Newer boundary.
        start: u32,
        /// Older boundary.
        end: u32,
    },

    /// `start - num_blocks` went below the genesis block.
    #[error("end height {end} below genesis (start height {start})")]
    BelowGenesis {
        /// Newer boundary.
        start: u32,
        /// Computed older boundary.
        end: i64,
    },
}

/// Errors raised by the block metrics collector. Collection stops at the first one.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// Fetching the block at `height` failed.
    #[error("failed to fetch block at height {height}: {source}")]
    Rpc {
        /// Height of the failing fetch.
        height: u32,
        /// Underlying source error.
        #[source]
        source: BlockSourceError,
    },

    /// The block lists bare txids, transaction objects are needed for classification.
    #[error("block at height {0} carries txids only, full transaction data is required")]
    MissingTransactionDetail(u32),
}

/// Errors in an HTML block template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A `{{` tag without its closing `}}`.
    #[error("unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),

    /// A tag naming a field that block metrics do not have.
    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Errors raised while writing the metrics report.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Creating, writing or closing a file failed.
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File or directory the operation targeted.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding of the metric sequence failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTML template could not be parsed.
    #[error("Template error in {path:?}: {source}")]
    Template {
        /// Template file.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: TemplateError,
    },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| OutputError::Io { path, source }
    }
}
