//! JsonRPC client implementation.
//!
//! Requests are sent exactly once: a failed call is reported to the caller, never retried.

use reqwest::{Client, ClientBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    any::type_name,
    convert::Infallible,
    fmt,
    net::SocketAddr,
    sync::{
        atomic::{AtomicI32, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, trace};

use crate::jsonrpsee::{
    error::{JsonRpcError, TransportError},
    response::{BlockObject, GetBlockError, GetBlockchainInfoResponse},
};

/// Verbosity passed to `getblock` to receive full transaction objects.
const VERBOSE_TRANSACTIONS: u8 = 2;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// JSON-RPC 2.0 request envelope.
#[derive(Serialize, Debug)]
struct RpcRequest<'a, T> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: i32,
}

/// JSON-RPC response envelope. zcashd sends a null `error` on success and a null `result` on
/// failure, zebrad omits the null member.
#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// Error object of a JSON-RPC response.
#[derive(Serialize, Deserialize, Debug)]
pub struct RpcError {
    /// Error code. zcashd uses the bitcoind codes, e.g. `-8` for an invalid parameter.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Error data.
    pub data: Option<JsonRpcError>,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Methods without documented error codes never map a node error to a method error.
impl TryFrom<RpcError> for Infallible {
    type Error = RpcError;

    fn try_from(value: RpcError) -> Result<Self, Self::Error> {
        Err(value)
    }
}

/// Ties a response type to the errors its method documents.
pub trait ResponseToError: Sized {
    /// Documented error of the method.
    type RpcError: std::fmt::Debug
        + TryFrom<RpcError, Error: std::error::Error + Send + Sync + 'static>;

    /// Turns a successful but semantically failed response into the method error.
    fn to_error(self) -> Result<Self, Self::RpcError> {
        Ok(self)
    }
}

/// Error type for JSON-RPC requests.
#[derive(Debug, thiserror::Error)]
pub enum RpcRequestError<MethodError> {
    /// HTTP, status code or envelope failure.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A documented error of the called method.
    #[error("Method error: {0:?}")]
    Method(MethodError),

    /// The request parameters failed to serialize.
    #[error("request input failed to serialize: {0:?}")]
    JsonRpc(serde_json::Error),

    /// A node error the method does not document.
    #[error("unexpected error response from node: {0}")]
    UnexpectedErrorResponse(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl<M> RpcRequestError<M>
where
    M: TryFrom<RpcError, Error: std::error::Error + Send + Sync + 'static>,
{
    fn from_node_error(error: RpcError) -> Self {
        match M::try_from(error) {
            Ok(method_error) => RpcRequestError::Method(method_error),
            Err(unexpected) => RpcRequestError::UnexpectedErrorResponse(Box::new(unexpected)),
        }
    }
}

/// Client for a zcashd or zebrad JSON-RPC endpoint using HTTP basic auth.
#[derive(Debug, Clone)]
pub struct JsonRpcConnector {
    url: Url,
    next_id: Arc<AtomicI32>,
    client: Client,
    username: String,
    password: String,
}

impl JsonRpcConnector {
    /// Creates a new JsonRpcConnector with Basic Authentication.
    ///
    /// `request_timeout` bounds every call. Redirects are not followed.
    pub fn new_with_basic_auth(
        url: Url,
        username: String,
        password: String,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            url,
            next_id: Arc::new(AtomicI32::new(0)),
            client,
            username,
            password,
        })
    }

    /// Creates a connector for the node at `node_rpc_address`.
    pub fn new_from_config_parts(
        node_rpc_address: SocketAddr,
        node_rpc_user: String,
        node_rpc_password: String,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        Self::new_with_basic_auth(
            node_url(node_rpc_address)?,
            node_rpc_user,
            node_rpc_password,
            request_timeout,
        )
    }

    /// Returns the URL requests are sent to.
    pub fn url(&self) -> Url {
        self.url.clone()
    }

    /// Sends one request and decodes the response envelope.
    async fn send_request<T, R>(
        &self,
        method: &str,
        params: T,
    ) -> Result<R, RpcRequestError<R::RpcError>>
    where
        T: std::fmt::Debug + Serialize,
        R: std::fmt::Debug + DeserializeOwned + ResponseToError,
        R::RpcError: Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!("Sending {method} request (id {id}) with params {params:?}");

        let body = serde_json::to_vec(&RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        })
        .map_err(RpcRequestError::JsonRpc)?;

        let response = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .basic_auth(&self.username, Some(&self.password))
            .body(body)
            .send()
            .await
            .map_err(TransportError::ReqwestError)?;

        let status = response.status();
        let body_bytes = response
            .bytes()
            .await
            .map_err(TransportError::ReqwestError)?;
        trace!("{method} (id {id}) answered {status}");

        if let Err(failure) = check_status(status, &body_bytes) {
            return Err(match failure {
                StatusFailure::Transport(e) => RpcRequestError::Transport(e),
                StatusFailure::Node(error) => RpcRequestError::from_node_error(error),
            });
        }

        let envelope: RpcResponse<R> = serde_json::from_slice(&body_bytes)
            .map_err(|e| TransportError::BadNodeData(Box::new(e), type_name::<R>()))?;

        match (envelope.error, envelope.result) {
            (Some(error), _) => Err(RpcRequestError::from_node_error(error)),
            (None, Some(result)) => result.to_error().map_err(RpcRequestError::Method),
            (None, None) => Err(TransportError::EmptyResponseBody.into()),
        }
    }

    /// Returns an object containing various state info regarding blockchain processing.
    ///
    /// zcashd reference: [`getblockchaininfo`](https://zcash.github.io/rpc/getblockchaininfo.html)
    pub async fn get_blockchain_info(
        &self,
    ) -> Result<GetBlockchainInfoResponse, RpcRequestError<Infallible>> {
        self.send_request("getblockchaininfo", ()).await
    }

    /// Returns the block at `height` with full transaction objects.
    ///
    /// A height outside the best chain is reported by the node with
    /// [error code `-8`](https://github.com/zcash/zcash/issues/5758).
    ///
    /// zcashd reference: [`getblock`](https://zcash.github.io/rpc/getblock.html)
    pub async fn get_block(
        &self,
        height: u32,
    ) -> Result<Box<BlockObject>, RpcRequestError<GetBlockError>> {
        // The node takes the height as a string, a number would be read as a hash prefix.
        let params = (height.to_string(), VERBOSE_TRANSACTIONS);
        self.send_request("getblock", params).await
    }
}

enum StatusFailure {
    Transport(TransportError),
    Node(RpcError),
}

/// Accepts 2xx. zcashd answers method errors with a 500 carrying a JSON-RPC error, which is
/// passed on as a node error.
fn check_status(status: StatusCode, body: &[u8]) -> Result<(), StatusFailure> {
    let code = status.as_u16();
    match code {
        200..=299 => Ok(()),
        100..=199 | 300..=399 => Err(StatusFailure::Transport(
            TransportError::UnexpectedStatusCode(code),
        )),
        400..=599 => match serde_json::from_slice::<RpcResponse<serde_json::Value>>(body) {
            Ok(RpcResponse {
                error: Some(error), ..
            }) => Err(StatusFailure::Node(error)),
            _ => Err(StatusFailure::Transport(TransportError::ErrorStatusCode(
                code,
            ))),
        },
        _ => Err(StatusFailure::Transport(TransportError::InvalidStatusCode(
            code,
        ))),
    }
}

/// Builds the http URL of a node from its socket address.
pub fn node_url(addr: SocketAddr) -> Result<Url, TransportError> {
    Ok(Url::parse(&format!("http://{addr}"))?)
}
