//! Resolution of the block height range a run covers.
//!
//! Ranges are described "from the tip backwards": `start` is the newer boundary and `end` the
//! older one. Blocks are still visited from `end` up to `start`.

use std::ops::RangeInclusive;

use tracing::info;

use crate::{error::RangeError, source::BlockSource};

/// Number of blocks to look back from `start` when no end height is given.
pub const DEFAULT_NUM_BLOCKS: u32 = 10;

/// User supplied range bounds. Unset values are resolved by [`HeightRange::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeOptions {
    /// Newer boundary. Defaults to the node's current chain height.
    pub start_height: Option<u32>,
    /// Older boundary. Defaults to `start - num_blocks`.
    pub end_height: Option<u32>,
    /// Look-back distance used when `end_height` is unset. Defaults to [`DEFAULT_NUM_BLOCKS`].
    pub num_blocks: Option<u32>,
}

/// A validated, inclusive range of block heights with `end <= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightRange {
    start: u32,
    end: u32,
}

impl HeightRange {
    /// Creates a range, rejecting `end > start`.
    pub fn new(start: u32, end: u32) -> Result<Self, RangeError> {
        if end > start {
            return Err(RangeError::EndAfterStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Resolves `options` into a concrete range.
    ///
    /// The node is queried for its chain height only when no start height is given.
    pub async fn resolve<S>(options: &RangeOptions, source: &S) -> Result<Self, RangeError>
    where
        S: BlockSource + ?Sized,
    {
        let start = match options.start_height {
            Some(start) => start,
            None => source
                .chain_height()
                .await
                .map_err(RangeError::ChainQuery)?,
        };

        let range = Self::from_start(start, options.end_height, options.num_blocks)?;
        info!(
            "Resolved block range: start height {}, end height {} ({} blocks)",
            range.start,
            range.end,
            range.len()
        );
        Ok(range)
    }

    /// Resolves the end boundary against a known start height.
    ///
    /// `start - num_blocks` is not clamped: a result below zero is rejected.
    pub fn from_start(
        start: u32,
        end_height: Option<u32>,
        num_blocks: Option<u32>,
    ) -> Result<Self, RangeError> {
        let end = match end_height {
            Some(end) => i64::from(end),
            None => i64::from(start) - i64::from(num_blocks.unwrap_or(DEFAULT_NUM_BLOCKS)),
        };

        match u32::try_from(end) {
            Ok(end) => Self::new(start, end),
            Err(_) => Err(RangeError::BelowGenesis { start, end }),
        }
    }

    /// The newer, upper boundary.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// The older, lower boundary.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of blocks covered, both bounds included.
    pub fn len(&self) -> u64 {
        u64::from(self.start - self.end) + 1
    }

    /// Always false: a valid range holds at least one height.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Heights in ascending order, `end` first.
    pub fn heights(&self) -> RangeInclusive<u32> {
        self.end..=self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::test::MockBlockSource;
    use zmetrics_fetch::jsonrpsee::response::BlockObject;

    fn chain_of(len: usize) -> MockBlockSource {
        let block: BlockObject = serde_json::from_str(r#"{"hash":"00","tx":[]}"#).unwrap();
        MockBlockSource::new(0, vec![block; len])
    }

    #[tokio::test]
    async fn defaults_look_back_ten_blocks_from_tip() {
        let source = chain_of(101);

        let range = HeightRange::resolve(&RangeOptions::default(), &source)
            .await
            .unwrap();

        assert_eq!((range.start(), range.end()), (100, 90));
        assert_eq!(range.len(), 11);
        assert_eq!(source.chain_queries(), 1);
    }

    #[tokio::test]
    async fn explicit_start_skips_chain_query() {
        let source = chain_of(1).without_chain_height();
        let options = RangeOptions {
            start_height: Some(500),
            end_height: None,
            num_blocks: Some(3),
        };

        let range = HeightRange::resolve(&options, &source).await.unwrap();

        assert_eq!((range.start(), range.end()), (500, 497));
        assert_eq!(source.chain_queries(), 0);
    }

    #[tokio::test]
    async fn end_after_start_is_rejected_without_fetching() {
        let source = chain_of(101);
        let options = RangeOptions {
            start_height: Some(50),
            end_height: Some(60),
            num_blocks: None,
        };

        let err = HeightRange::resolve(&options, &source).await.unwrap_err();

        assert!(matches!(
            err,
            RangeError::EndAfterStart { start: 50, end: 60 }
        ));
        assert!(source.fetched_heights().is_empty());
        assert_eq!(source.chain_queries(), 0);
    }

    #[tokio::test]
    async fn failed_chain_query_is_reported() {
        let source = chain_of(1).without_chain_height();

        let err = HeightRange::resolve(&RangeOptions::default(), &source)
            .await
            .unwrap_err();

        assert!(matches!(err, RangeError::ChainQuery(_)));
    }

    #[test]
    fn lookback_past_genesis_is_not_clamped() {
        let err = HeightRange::from_start(5, None, Some(10)).unwrap_err();
        assert!(matches!(err, RangeError::BelowGenesis { start: 5, end: -5 }));
    }

    #[test]
    fn explicit_end_wins_over_num_blocks() {
        let range = HeightRange::from_start(100, Some(99), Some(50)).unwrap();
        assert_eq!(range.heights().collect::<Vec<_>>(), vec![99, 100]);
    }

    #[test]
    fn zero_lookback_covers_a_single_block() {
        let range = HeightRange::from_start(7, None, Some(0)).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.heights().collect::<Vec<_>>(), vec![7]);
    }
}
