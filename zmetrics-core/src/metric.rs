//! Per-block summary metrics.

use serde::Serialize;
use zmetrics_fetch::jsonrpsee::response::{BlockObject, GetBlockTransaction};

use crate::{classify::TransactionKind, error::CollectError};

/// Summary of one block. Field names serialize in camelCase, e.g. `numberOfShielded`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetric {
    /// Block height.
    pub height: u32,
    /// Sapling pool balance in ZEC as of this block.
    pub sapling_value_pool: f64,
    /// Sprout pool balance in ZEC as of this block.
    pub sprout_value_pool: f64,
    /// Block size in bytes.
    pub size: i64,
    /// Block time, unix seconds.
    pub time: i64,
    /// Total transactions in the block.
    pub number_of_transactions: u64,
    /// Transactions classified [`TransactionKind::Transparent`].
    pub number_of_transparent: u64,
    /// Transactions classified [`TransactionKind::Mixed`].
    pub number_of_mixed: u64,
    /// Transactions classified [`TransactionKind::Shielded`].
    pub number_of_shielded: u64,
}

impl BlockMetric {
    /// Names of the fields as they appear in reports and templates.
    pub const FIELDS: [&'static str; 9] = [
        "height",
        "saplingValuePool",
        "sproutValuePool",
        "size",
        "time",
        "numberOfTransactions",
        "numberOfTransparent",
        "numberOfMixed",
        "numberOfShielded",
    ];

    /// Builds the metric for the block fetched at `height`, visiting its transactions once.
    pub fn from_block(height: u32, block: &BlockObject) -> Result<Self, CollectError> {
        let mut metric = BlockMetric {
            height,
            sapling_value_pool: block.sapling_value_pool(),
            sprout_value_pool: block.sprout_value_pool(),
            size: block.size.unwrap_or_default(),
            time: block.time.unwrap_or_default(),
            number_of_transactions: 0,
            number_of_transparent: 0,
            number_of_mixed: 0,
            number_of_shielded: 0,
        };

        for tx in &block.tx {
            let GetBlockTransaction::Object(tx) = tx else {
                return Err(CollectError::MissingTransactionDetail(height));
            };
            metric.number_of_transactions += 1;
            match TransactionKind::classify(tx) {
                Some(TransactionKind::Transparent) => metric.number_of_transparent += 1,
                Some(TransactionKind::Mixed) => metric.number_of_mixed += 1,
                Some(TransactionKind::Shielded) => metric.number_of_shielded += 1,
                None => {}
            }
        }

        Ok(metric)
    }

    /// Returns the display value of the field named `name` (one of [`Self::FIELDS`]).
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "height" => self.height.to_string(),
            "saplingValuePool" => self.sapling_value_pool.to_string(),
            "sproutValuePool" => self.sprout_value_pool.to_string(),
            "size" => self.size.to_string(),
            "time" => self.time.to_string(),
            "numberOfTransactions" => self.number_of_transactions.to_string(),
            "numberOfTransparent" => self.number_of_transparent.to_string(),
            "numberOfMixed" => self.number_of_mixed.to_string(),
            "numberOfShielded" => self.number_of_shielded.to_string(),
            _ => return None,
        };
        Some(value)
    }
}
