//! Ordered-failover JSON-RPC client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{
    HttpTransport, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcOptions, RpcTransport,
    TransportError,
};
use crate::chain::redact_endpoint;
use crate::error::Error;

/// Number of endpoints that must answer before a response is accepted.
///
/// Fixed at one: the client provides availability, not cross-validation.
pub const QUORUM: usize = 1;

/// Transport failure recorded for one endpoint during a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    /// Endpoint that failed, redacted to scheme and host.
    pub endpoint: String,
    /// Why it failed.
    pub error: TransportError,
}

/// Failure of a request issued through a [`FallbackClient`].
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Every endpoint failed at the transport level; failures are in
    /// endpoint order.
    #[error("all {} RPC endpoints failed", failures.len())]
    AllEndpointsFailed {
        /// One entry per endpoint tried.
        failures: Vec<EndpointFailure>,
    },

    /// An endpoint answered with a JSON-RPC error object.
    #[error("rpc error: {0}")]
    Application(JsonRpcError),

    /// The result could not be decoded into the requested type.
    #[error("failed to decode result: {0}")]
    Decode(String),
}

/// One logical RPC client over several endpoints.
///
/// Requests go to the endpoints strictly in order. A transport failure moves
/// the request to the next endpoint; the first well-formed response wins and
/// is returned as-is, even when it carries a JSON-RPC error.
#[derive(Debug, Clone)]
pub struct FallbackClient {
    transports: Vec<Arc<dyn RpcTransport>>,
    next_id: Arc<AtomicU64>,
}

impl FallbackClient {
    /// Builds a client with one HTTP transport per URL, in list order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `urls` is empty or any URL is invalid.
    pub fn build<I, S>(urls: I, options: &RpcOptions) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build_with_client(urls, &options.http_client()?)
    }

    /// Like [`build`](Self::build), sharing an existing connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `urls` is empty or any URL is invalid.
    pub fn build_with_client<I, S>(urls: I, client: &Client) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let transports = urls
            .into_iter()
            .map(|url| {
                HttpTransport::new(url.as_ref(), client.clone())
                    .map(|t| Arc::new(t) as Arc<dyn RpcTransport>)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_transports(transports)
    }

    /// Composes existing transports, in failover order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `transports` is empty.
    pub fn from_transports(transports: Vec<Arc<dyn RpcTransport>>) -> Result<Self, Error> {
        if transports.is_empty() {
            return Err(Error::config(
                "fallback RPC client needs at least one endpoint",
            ));
        }
        Ok(Self {
            transports,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Endpoints in failover order.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> + '_ {
        self.transports.iter().map(|t| t.endpoint())
    }

    /// Required agreement count; always [`QUORUM`].
    #[must_use]
    pub const fn quorum(&self) -> usize {
        QUORUM
    }

    /// Sends `method` with `params`, returning the first well-formed response.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::AllEndpointsFailed`] if no endpoint produced a
    /// response.
    pub async fn request(&self, method: &str, params: Value) -> Result<JsonRpcResponse, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.send(&JsonRpcRequest::new(id, method, params)).await
    }

    /// Sends a prepared request through the failover chain.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::AllEndpointsFailed`] if no endpoint produced a
    /// response.
    pub async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
        let mut failures = Vec::new();

        for transport in &self.transports {
            let endpoint = redact_endpoint(transport.endpoint());
            tracing::debug!(%endpoint, method = %request.method, "sending RPC request");
            match transport.send(request).await {
                Ok(response) => {
                    if !failures.is_empty() {
                        tracing::info!(
                            %endpoint,
                            skipped = failures.len(),
                            "RPC request served by fallback endpoint"
                        );
                    }
                    return Ok(response);
                }
                Err(error) => {
                    tracing::warn!(
                        %endpoint,
                        %error,
                        monotonic_counter.rpc_endpoint_failures = 1_u64,
                        "RPC endpoint failed, trying next"
                    );
                    failures.push(EndpointFailure { endpoint, error });
                }
            }
        }

        Err(RpcError::AllEndpointsFailed { failures })
    }

    /// Sends `method` and decodes its result into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Application`] for a JSON-RPC error object,
    /// [`RpcError::Decode`] if the result does not fit `T`, and
    /// [`RpcError::AllEndpointsFailed`] if no endpoint answered.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let response = self.request(method, params).await?;
        let result = response.payload.map_err(RpcError::Application)?;
        serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    #[derive(Debug)]
    struct MockTransport {
        endpoint: String,
        reply: Result<JsonRpcResponse, TransportError>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        fn new(endpoint: &str, reply: Result<JsonRpcResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                endpoint: endpoint.to_owned(),
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RpcTransport for MockTransport {
        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map(|mut response| {
                response.id = request.id.clone();
                response
            })
        }
    }

    fn ok(value: Value) -> Result<JsonRpcResponse, TransportError> {
        Ok(JsonRpcResponse::result(Value::Null, value))
    }

    fn client(transports: &[Arc<MockTransport>]) -> FallbackClient {
        FallbackClient::from_transports(
            transports
                .iter()
                .map(|t| Arc::clone(t) as Arc<dyn RpcTransport>)
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn skips_failed_endpoints_and_stops_at_first_success() {
        let endpoints = [
            MockTransport::new("a", Err(TransportError::Timeout)),
            MockTransport::new("b", Err(TransportError::Status(503))),
            MockTransport::new("c", ok(json!("0x10"))),
            MockTransport::new("d", ok(json!("0x20"))),
        ];
        let client = client(&endpoints);

        let block: String = client.call("eth_blockNumber", json!([])).await.unwrap();

        assert_eq!(block, "0x10");
        let calls: Vec<usize> = endpoints.iter().map(|e| e.calls()).collect();
        assert_eq!(calls, [1, 1, 1, 0]);
    }

    #[tokio::test]
    async fn application_errors_do_not_fall_back() {
        let revert = JsonRpcError {
            code: 3,
            message: "execution reverted".to_owned(),
            data: None,
        };
        let endpoints = [
            MockTransport::new("a", Ok(JsonRpcResponse::error(Value::Null, revert.clone()))),
            MockTransport::new("b", ok(json!("0x1"))),
        ];
        let client = client(&endpoints);

        let response = client.request("eth_call", json!([])).await.unwrap();
        assert_eq!(response.payload, Err(revert.clone()));
        assert_eq!(endpoints[1].calls(), 0);

        let err = client.call::<String>("eth_call", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Application(e) if e == revert));
    }

    #[tokio::test]
    async fn reports_every_failure_in_order() {
        let endpoints = [
            MockTransport::new(
                "https://rpc.a/v2/SECRETKEY123",
                Err(TransportError::Connect("refused".to_owned())),
            ),
            MockTransport::new("https://rpc.b:8545", Err(TransportError::Timeout)),
        ];
        let client = client(&endpoints);

        let err = client.request("eth_chainId", json!([])).await.unwrap_err();
        let RpcError::AllEndpointsFailed { failures } = err else {
            panic!("expected AllEndpointsFailed, got {err:?}");
        };
        let order: Vec<&str> = failures.iter().map(|f| f.endpoint.as_str()).collect();
        assert_eq!(order, ["https://rpc.a", "https://rpc.b:8545"]);
        assert_eq!(failures[1].error, TransportError::Timeout);
    }

    #[tokio::test]
    async fn decode_failures_are_reported() {
        let endpoints = [MockTransport::new("a", ok(json!({"not": "a number"})))];
        let err = client(&endpoints)
            .call::<u64>("eth_chainId", json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[test]
    fn empty_endpoint_lists_are_configuration_errors() {
        assert!(matches!(
            FallbackClient::from_transports(Vec::new()),
            Err(Error::Config(_))
        ));
        let none: [&str; 0] = [];
        assert!(matches!(
            FallbackClient::build(none, &RpcOptions::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn build_keeps_url_order() {
        let client = FallbackClient::build(
            ["https://rpc.a", "https://rpc.b"],
            &RpcOptions::default(),
        )
        .unwrap();
        assert_eq!(client.endpoints().collect::<Vec<_>>(), ["https://rpc.a", "https://rpc.b"]);
        assert_eq!(client.quorum(), 1);
    }
}
