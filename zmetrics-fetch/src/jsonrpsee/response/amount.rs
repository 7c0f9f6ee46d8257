//! Zatoshi amounts as reported by the node.

use serde::{Deserialize, Deserializer, Serialize};

/// Zatoshis per ZEC.
pub const ZATS_PER_ZEC: u64 = 100_000_000;

/// Represents a non-negative amount in Zatoshis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Zatoshis(pub u64);

impl Zatoshis {
    /// Converts a ZEC decimal into zatoshis, rounding to the nearest zatoshi.
    pub fn try_from_zec(zec: f64) -> Result<Self, &'static str> {
        if !zec.is_finite() || zec < 0.0 {
            return Err("invalid amount");
        }
        let z = (zec * ZATS_PER_ZEC as f64).round();
        if z > u64::MAX as f64 {
            return Err("overflow");
        }
        Ok(Self(z as u64))
    }

    /// Returns the amount as a ZEC decimal.
    pub fn to_zec(self) -> f64 {
        self.0 as f64 / ZATS_PER_ZEC as f64
    }
}

impl<'de> Deserialize<'de> for Zatoshis {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IntLike {
            U64(u64),
            I64(i64),
        }

        match IntLike::deserialize(de)? {
            IntLike::U64(u) => Ok(Zatoshis(u)),
            IntLike::I64(_) => Err(serde::de::Error::custom("negative amount")),
        }
    }
}
