//! Transaction types embedded in a verbose (`verbosity = 2`) `getblock` response.
//!
//! Only the component lists needed to tell transparent and shielded parts apart are typed.
//! Unknown fields are ignored so zcashd and zebrad responses both parse.

use serde::{Deserialize, Serialize};

/// An entry of a block's `tx` list.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GetBlockTransaction {
    /// Hex encoded txid, returned at verbosity 1.
    Hash(String),
    /// Full transaction object, returned at verbosity 2.
    Object(Box<TransactionObject>),
}

/// A transaction object as returned inside a verbose block.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TransactionObject {
    /// Transaction id, hex encoded.
    #[serde(default)]
    pub txid: String,

    /// Transaction format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Transparent inputs.
    #[serde(default)]
    pub vin: Vec<TransparentInput>,

    /// Transparent outputs.
    #[serde(default)]
    pub vout: Vec<TransparentOutput>,

    /// Sprout JoinSplit descriptions.
    #[serde(default)]
    pub vjoinsplit: Vec<JoinSplit>,

    /// Sapling spend descriptions.
    #[serde(rename = "vShieldedSpend", default)]
    pub shielded_spends: Vec<ShieldedSpend>,

    /// Sapling output descriptions.
    #[serde(rename = "vShieldedOutput", default)]
    pub shielded_outputs: Vec<ShieldedOutput>,

    /// Orchard bundle, present from v5 transactions on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchard: Option<OrchardBundle>,
}

impl TransactionObject {
    /// Returns true if the transaction has any transparent input or output.
    pub fn has_transparent_components(&self) -> bool {
        !self.vin.is_empty() || !self.vout.is_empty()
    }

    /// Returns true if the transaction has any Sprout, Sapling or Orchard component.
    pub fn has_shielded_components(&self) -> bool {
        !self.vjoinsplit.is_empty()
            || !self.shielded_spends.is_empty()
            || !self.shielded_outputs.is_empty()
            || self
                .orchard
                .as_ref()
                .is_some_and(|bundle| !bundle.actions.is_empty())
    }
}

/// A transparent input.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TransparentInput {
    /// Coinbase script, hex encoded. Only set on coinbase inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    /// Txid of the spent output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    /// Index of the spent output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
}

/// A transparent output.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TransparentOutput {
    /// Output value in ZEC.
    #[serde(default)]
    pub value: f64,
    /// Output index.
    #[serde(default)]
    pub n: u32,
}

/// A Sprout JoinSplit description.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct JoinSplit {
    /// Value entering the Sprout pool, in ZEC.
    #[serde(default)]
    pub vpub_old: f64,
    /// Value leaving the Sprout pool, in ZEC.
    #[serde(default)]
    pub vpub_new: f64,
}

/// A Sapling spend description.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ShieldedSpend {
    /// Nullifier of the spent note, hex encoded.
    #[serde(default)]
    pub nullifier: String,
}

/// A Sapling output description.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ShieldedOutput {
    /// Note commitment u-coordinate, hex encoded.
    #[serde(default)]
    pub cmu: String,
}

/// The Orchard part of a transaction.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct OrchardBundle {
    /// Orchard actions.
    #[serde(default)]
    pub actions: Vec<OrchardAction>,
}

/// An Orchard action.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct OrchardAction {
    /// Nullifier of the spent note, hex encoded.
    #[serde(default)]
    pub nullifier: String,
    /// Commitment of the created note, hex encoded.
    #[serde(default)]
    pub cmx: String,
}
