//! JsonRPC client implementation and response types.

pub mod connector;
pub mod error;
pub mod response;
