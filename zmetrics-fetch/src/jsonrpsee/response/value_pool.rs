//! Value pool balances reported by `getblock`.

use serde::{de::Error, Deserialize, Deserializer, Serialize};

use super::amount::Zatoshis;

/// Id of the Sprout shielded pool.
pub const SPROUT_POOL_ID: &str = "sprout";
/// Id of the Sapling shielded pool.
pub const SAPLING_POOL_ID: &str = "sapling";

/// Balance of a single value pool.
///
/// zcashd omits `chainValue` for pools it does not monitor, so the balance is optional.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValuePoolBalance {
    /// Pool id, e.g. `sapling`.
    pub id: String,
    /// Whether the node tracks this pool's balance.
    pub monitored: bool,
    /// Total value held by the pool.
    #[serde(rename = "chainValueZat", skip_serializing_if = "Option::is_none")]
    pub chain_value: Option<Zatoshis>,
    /// Change to the pool balance caused by this block, in zatoshis.
    #[serde(rename = "valueDeltaZat", skip_serializing_if = "Option::is_none")]
    pub value_delta_zat: Option<i64>,
}

impl ValuePoolBalance {
    /// Pool balance in ZEC, zero when unknown.
    pub fn chain_value_zec(&self) -> f64 {
        self.chain_value.map(Zatoshis::to_zec).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for ValuePoolBalance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize, Debug)]
        struct TempBalance {
            #[serde(default)]
            id: String,
            #[serde(default)]
            monitored: bool,
            #[serde(rename = "chainValue", default)]
            chain_value: Option<f64>,
            #[serde(rename = "chainValueZat", default)]
            chain_value_zat: Option<Zatoshis>,
            #[serde(rename = "valueDeltaZat", default)]
            value_delta_zat: Option<i64>,
        }
        let temp = TempBalance::deserialize(deserializer)?;

        let chain_value = match (temp.chain_value, temp.chain_value_zat) {
            (Some(zec), Some(zat)) => {
                let computed = Zatoshis::try_from_zec(zec).map_err(D::Error::custom)?;
                if computed != zat {
                    return Err(D::Error::custom(format!(
                        "chainValue and chainValueZat mismatch: computed {} but got {}",
                        computed.0, zat.0
                    )));
                }
                Some(zat)
            }
            (None, Some(zat)) => Some(zat),
            (Some(zec), None) => Some(Zatoshis::try_from_zec(zec).map_err(D::Error::custom)?),
            (None, None) => None,
        };

        Ok(ValuePoolBalance {
            id: temp.id,
            monitored: temp.monitored,
            chain_value,
            value_delta_zat: temp.value_delta_zat,
        })
    }
}
