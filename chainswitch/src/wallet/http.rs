//! Wallet reached over HTTP JSON-RPC, e.g. a signer daemon or a browser
//! bridge exposing EIP-1193 `request` as a POST endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::provider::{WalletError, WalletProvider};
use super::request::WalletRequest;
use crate::error::Error;
use crate::rpc::{HttpTransport, JsonRpcRequest, RpcOptions, RpcTransport};

/// [`WalletProvider`] that forwards each request as one JSON-RPC call.
#[derive(Debug)]
pub struct HttpWallet {
    transport: HttpTransport,
    next_id: AtomicU64,
}

impl HttpWallet {
    /// Connects to the wallet endpoint at `url`.
    ///
    /// `options.timeout` bounds each request, including the time a user
    /// spends on the wallet prompt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `url` is invalid or the HTTP client
    /// cannot be built.
    pub fn new(url: &str, options: &RpcOptions) -> Result<Self, Error> {
        let transport = HttpTransport::new(url, options.http_client()?)?;
        Ok(Self {
            transport,
            next_id: AtomicU64::new(1),
        })
    }

    /// Wallet endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }
}

#[async_trait]
impl WalletProvider for HttpWallet {
    async fn request(&self, request: &WalletRequest) -> Result<Value, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let rpc = JsonRpcRequest::new(id, request.method(), request.params());
        let response = self
            .transport
            .send(&rpc)
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;
        response.payload.map_err(WalletError::from)
    }
}
