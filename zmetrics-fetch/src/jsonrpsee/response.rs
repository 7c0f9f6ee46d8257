//! Response types for jsonRPC client.

pub mod amount;
pub mod transaction;
pub mod value_pool;

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::jsonrpsee::connector::{ResponseToError, RpcError};

pub use transaction::{GetBlockTransaction, TransactionObject};
pub use value_pool::{ValuePoolBalance, SAPLING_POOL_ID, SPROUT_POOL_ID};

/// Response to a `getblockchaininfo` RPC request.
///
/// Only the fields zmetrics reads are typed, the rest of the object is ignored.
///
/// This is used for the output parameter of [`crate::jsonrpsee::connector::JsonRpcConnector::get_blockchain_info`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GetBlockchainInfoResponse {
    /// Current network name as defined in BIP70 (main, test, regtest)
    pub chain: String,

    /// The current number of blocks processed in the server, numeric
    pub blocks: u32,
}

impl ResponseToError for GetBlockchainInfoResponse {
    type RpcError = Infallible;
}

/// Error type for the `getblock` RPC request.
#[derive(Debug, thiserror::Error)]
pub enum GetBlockError {
    /// The requested block hash or height is not in the node's best chain.
    #[error("Block not found: {0}")]
    MissingBlock(String),
}

impl TryFrom<RpcError> for GetBlockError {
    type Error = RpcError;

    fn try_from(value: RpcError) -> Result<Self, Self::Error> {
        if value.code == -8 {
            Ok(Self::MissingBlock(value.message))
        } else {
            Err(value)
        }
    }
}

impl ResponseToError for Box<BlockObject> {
    type RpcError = GetBlockError;
}

/// A block object containing data and metadata about a block.
///
/// This is used for the output parameter of [`crate::jsonrpsee::connector::JsonRpcConnector::get_block`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BlockObject {
    /// The hash of the requested block.
    pub hash: String,

    /// The number of confirmations of this block in the best chain,
    /// or -1 if it is not in the best chain.
    #[serde(default)]
    pub confirmations: i64,

    /// The block size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,

    /// The height of the requested block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// The version field of the requested block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// The block time, in seconds since the unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,

    /// Transactions in block order.
    ///
    /// Bare txids at verbosity 1, full transaction objects at verbosity 2.
    #[serde(default)]
    pub tx: Vec<GetBlockTransaction>,

    /// Value pool balances as of this block.
    #[serde(rename = "valuePools", default)]
    pub value_pools: Vec<ValuePoolBalance>,

    /// The previous block hash of the requested block header.
    #[serde(
        rename = "previousblockhash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_block_hash: Option<String>,

    /// The next block hash after the requested block header.
    #[serde(
        rename = "nextblockhash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_block_hash: Option<String>,
}

impl BlockObject {
    /// Returns the pool balance with the given id, if the node reported it.
    pub fn value_pool(&self, id: &str) -> Option<&ValuePoolBalance> {
        self.value_pools.iter().find(|pool| pool.id == id)
    }

    /// Sapling pool balance in ZEC, zero when not reported.
    pub fn sapling_value_pool(&self) -> f64 {
        self.value_pool(SAPLING_POOL_ID)
            .map(ValuePoolBalance::chain_value_zec)
            .unwrap_or_default()
    }

    /// Sprout pool balance in ZEC, zero when not reported.
    pub fn sprout_value_pool(&self) -> f64 {
        self.value_pool(SPROUT_POOL_ID)
            .map(ValuePoolBalance::chain_value_zec)
            .unwrap_or_default()
    }
}
