//! Wallet boundary: the provider trait, its error contract and the
//! non-reentrant handle.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use super::request::WalletRequest;
use crate::rpc::JsonRpcError;

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_ERROR_CODE: i64 = 4001;

/// EIP-3326 "unrecognized chain id"; the only error that triggers an
/// add-chain request.
pub const UNRECOGNIZED_CHAIN_ERROR_CODE: i64 = 4902;

/// Error returned by a wallet request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// Structured provider error.
    #[error("wallet error {code}: {message}")]
    Rpc {
        /// EIP-1193 / JSON-RPC error code.
        code: i64,
        /// Provider message.
        message: String,
        /// Optional provider payload.
        data: Option<Value>,
    },

    /// The wallet could not be reached or answered with garbage.
    #[error("wallet transport failure: {0}")]
    Transport(String),
}

impl WalletError {
    /// Structured error with no payload.
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Error code, for structured errors.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            Self::Transport(_) => None,
        }
    }

    /// Whether the wallet does not know the requested chain.
    ///
    /// Some mobile wallets wrap the provider error and report the original
    /// code under `data.originalError.code`.
    #[must_use]
    pub fn is_unrecognized_chain(&self) -> bool {
        match self {
            Self::Rpc { code, data, .. } => {
                *code == UNRECOGNIZED_CHAIN_ERROR_CODE
                    || data
                        .as_ref()
                        .and_then(|d| d.pointer("/originalError/code"))
                        .and_then(Value::as_i64)
                        == Some(UNRECOGNIZED_CHAIN_ERROR_CODE)
            }
            Self::Transport(_) => false,
        }
    }

    /// Whether the user declined the request.
    #[must_use]
    pub const fn is_user_rejected(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == USER_REJECTED_ERROR_CODE)
    }
}

impl From<JsonRpcError> for WalletError {
    fn from(error: JsonRpcError) -> Self {
        Self::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

/// An EIP-1193 style wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Sends one request and returns its result.
    async fn request(&self, request: &WalletRequest) -> Result<Value, WalletError>;
}

/// A connected wallet.
///
/// Only one switch/add exchange may be outstanding per handle at a time.
#[derive(Debug)]
pub struct WalletHandle<W> {
    provider: W,
    in_flight: Mutex<()>,
}

impl<W: WalletProvider> WalletHandle<W> {
    /// Wraps a provider.
    pub fn new(provider: W) -> Self {
        Self {
            provider,
            in_flight: Mutex::new(()),
        }
    }

    /// The wrapped provider.
    pub const fn provider(&self) -> &W {
        &self.provider
    }

    /// Whether an exchange is currently outstanding on this handle.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Marks an exchange as outstanding until the guard drops; `None` if one
    /// already is.
    pub(crate) fn try_begin(&self) -> Option<MutexGuard<'_, ()>> {
        self.in_flight.try_lock().ok()
    }
}
