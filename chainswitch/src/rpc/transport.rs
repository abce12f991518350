//! JSON-RPC 2.0 message types and the single-endpoint transport seam.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::Error;

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Default per-endpoint request timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Request id echoed by the server.
    #[serde(default)]
    pub id: Value,
    /// RPC method name, e.g. `eth_blockNumber`.
    pub method: String,
    /// Positional or named parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Creates a request with a numeric id.
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id: Value::from(id),
            method: method.into(),
            params,
        }
    }
}

/// Error object carried by a well-formed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Well-formed JSON-RPC response: exactly one of a result or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    /// Response id.
    pub id: Value,
    /// Success value or application-level error.
    pub payload: Result<Value, JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response.
    #[must_use]
    pub const fn result(id: Value, result: Value) -> Self {
        Self {
            id,
            payload: Ok(result),
        }
    }

    /// Error response.
    #[must_use]
    pub const fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            id,
            payload: Err(error),
        }
    }

    /// Whether the response carries an application-level error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.payload.is_err()
    }

    /// Parses a decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Decode`] if the body is not an object with a
    /// `result` member or a valid `error` member.
    pub fn from_value(value: Value) -> Result<Self, TransportError> {
        let Value::Object(mut object) = value else {
            return Err(TransportError::Decode(
                "response is not a JSON object".to_owned(),
            ));
        };
        let id = object.remove("id").unwrap_or(Value::Null);
        if let Some(error) = object.remove("error").filter(|e| !e.is_null()) {
            let error: JsonRpcError = serde_json::from_value(error)
                .map_err(|e| TransportError::Decode(format!("malformed error object: {e}")))?;
            return Ok(Self::error(id, error));
        }
        object.remove("result").map_or_else(
            || {
                Err(TransportError::Decode(
                    "response has neither result nor error".to_owned(),
                ))
            },
            |result| Ok(Self::result(id, result)),
        )
    }
}

impl Serialize for JsonRpcResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("JsonRpcResponse", 3)?;
        state.serialize_field("jsonrpc", JSONRPC_VERSION)?;
        state.serialize_field("id", &self.id)?;
        match &self.payload {
            Ok(result) => state.serialize_field("result", result)?,
            Err(error) => state.serialize_field("error", error)?,
        }
        state.end()
    }
}

/// Connection-level failure of a single endpoint. Every variant makes the
/// fallback client move on to the next endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// Connection refused, reset or DNS failure.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Non-2xx HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),
    /// Body was not a JSON-RPC response.
    #[error("invalid response: {0}")]
    Decode(String),
    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),
}

/// One RPC endpoint.
///
/// Implementations return `Ok` for every well-formed JSON-RPC response,
/// including responses whose payload is an error object, and `Err` only for
/// transport failures.
#[async_trait]
pub trait RpcTransport: fmt::Debug + Send + Sync {
    /// Endpoint identifier used in logs and failure reports.
    fn endpoint(&self) -> &str;

    /// Sends one request.
    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;
}

/// Options for HTTP transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcOptions {
    /// Per-endpoint request timeout.
    pub timeout: Duration,
}

impl Default for RpcOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl RpcOptions {
    /// Builds the shared HTTP client for these options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> Result<Client, Error> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::config_with("failed to build HTTP client", e))
    }
}

/// JSON-RPC over HTTP(S) POST.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: Url,
    endpoint: String,
}

impl HttpTransport {
    /// Creates a transport for `endpoint` sharing `client`'s connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `endpoint` is not a valid URL.
    pub fn new(endpoint: &str, client: Client) -> Result<Self, Error> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::config_with(format!("invalid RPC URL '{endpoint}'"), e))?;
        Ok(Self {
            client,
            url,
            endpoint: endpoint.to_owned(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| TransportError::Decode(format!("body is not JSON: {e}")))?;
        JsonRpcResponse::from_value(value)
    }
}

// Messages end up in 502 bodies, so the URL (and any key in it) is dropped.
fn classify(error: reqwest::Error) -> TransportError {
    let error = error.without_url();
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(describe(&error))
    } else {
        TransportError::Request(describe(&error))
    }
}

fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
