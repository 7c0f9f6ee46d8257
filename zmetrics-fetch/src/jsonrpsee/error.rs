//! Hold error types for the JsonRpcConnector and related functionality.

/// Error object carried in the `data` field of a node error response.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Additional error data.
    pub data: Option<serde_json::Value>,
}

/// General error type for handling JsonRpcConnector errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Reqwest Based Errors.
    #[error("Error: HTTP Request Error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// URL Parse Errors.
    #[error("Error: Invalid URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// Status code outside of the valid HTTP range.
    #[error("Error: Invalid HTTP status code: {0}")]
    InvalidStatusCode(u16),

    /// Informational or redirection status code.
    #[error("Error: Unexpected HTTP status code: {0}")]
    UnexpectedStatusCode(u16),

    /// Client or server error status code.
    #[error("Error: HTTP error status code: {0}")]
    ErrorStatusCode(u16),

    /// The node returned data that could not be parsed into the expected type.
    #[error("Error: Bad node data for {1}: {0}")]
    BadNodeData(
        Box<dyn std::error::Error + Send + Sync + 'static>,
        &'static str,
    ),

    /// The node returned neither a result nor an error.
    #[error("Error: Empty response body")]
    EmptyResponseBody,
}
