//! BlockSource is the connection zmetrics holds to the Zcash node it reads blocks from.

use async_trait::async_trait;
use tracing::debug;
use zmetrics_fetch::jsonrpsee::{
    connector::{JsonRpcConnector, RpcRequestError},
    response::{BlockObject, GetBlockError},
};

use crate::error::BlockSourceError;

/// Result type of [`BlockSource`] calls.
pub type BlockSourceResult<T> = Result<T, BlockSourceError>;

/// A trait for reading chain data from a node.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Returns the height of the node's current chain tip.
    async fn chain_height(&self) -> BlockSourceResult<u32>;

    /// Returns the block at `height` with full transaction objects.
    async fn get_verbose_block(&self, height: u32) -> BlockSourceResult<BlockObject>;
}

#[async_trait]
impl BlockSource for JsonRpcConnector {
    async fn chain_height(&self) -> BlockSourceResult<u32> {
        let info = self
            .get_blockchain_info()
            .await
            .map_err(|e| BlockSourceError::Unrecoverable(e.to_string()))?;
        debug!("Node reports chain {} at height {}", info.chain, info.blocks);
        Ok(info.blocks)
    }

    async fn get_verbose_block(&self, height: u32) -> BlockSourceResult<BlockObject> {
        match self.get_block(height).await {
            Ok(block) => Ok(*block),
            Err(RpcRequestError::Method(GetBlockError::MissingBlock(_))) => {
                Err(BlockSourceError::MissingBlock(height))
            }
            Err(e) => Err(BlockSourceError::Unrecoverable(e.to_string())),
        }
    }
}
