//! A chain-fetching client that uses zcashd's (or zebrad's) JsonRPC interface.
//!
//! Used by zmetrics to read the current chain height and verbose block data.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod jsonrpsee;
