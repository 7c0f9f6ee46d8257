//! Sequential collection of block metrics over a height range.

use tracing::{debug, info};

use crate::{error::CollectError, metric::BlockMetric, range::HeightRange, source::BlockSource};

/// Fetches every block in `range`, lowest height first, and builds its metric.
///
/// One request is in flight at a time. The first failure aborts the whole collection and no
/// partial sequence is returned.
pub async fn collect_block_metrics<S>(
    range: HeightRange,
    source: &S,
) -> Result<Vec<BlockMetric>, CollectError>
where
    S: BlockSource + ?Sized,
{
    collect_block_metrics_with(range, source, |_| Ok::<_, CollectError>(())).await
}

/// Like [`collect_block_metrics`], handing each metric to `on_block` as soon as it is built.
///
/// Work done by `on_block` for lower heights is kept when a later height fails.
pub async fn collect_block_metrics_with<S, F, E>(
    range: HeightRange,
    source: &S,
    mut on_block: F,
) -> Result<Vec<BlockMetric>, E>
where
    S: BlockSource + ?Sized,
    F: FnMut(&BlockMetric) -> Result<(), E>,
    E: From<CollectError>,
{
    let mut metrics = Vec::with_capacity(usize::try_from(range.len()).unwrap_or_default());

    for height in range.heights() {
        let block = source
            .get_verbose_block(height)
            .await
            .map_err(|source| CollectError::Rpc { height, source })?;

        let metric = BlockMetric::from_block(height, &block)?;
        debug!(
            height,
            transactions = metric.number_of_transactions,
            transparent = metric.number_of_transparent,
            mixed = metric.number_of_mixed,
            shielded = metric.number_of_shielded,
            "Collected block metric"
        );
        on_block(&metric)?;
        metrics.push(metric);
    }

    info!(
        "Collected metrics for {} blocks ({}..={})",
        metrics.len(),
        range.end(),
        range.start()
    );
    Ok(metrics)
}
