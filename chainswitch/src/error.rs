//! Unified error types for chainswitch.

use thiserror::Error;

/// Top-level error type for registry loading, client construction and the
/// HTTP service.
///
/// Per-call outcomes (RPC failover, wallet negotiation) have their own types
/// in [`crate::rpc`] and [`crate::wallet`]; this enum covers the failures that
/// are either fatal at startup or surface as "not found" to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or registry table is malformed (duplicate chain id, empty
    /// endpoint list, unparsable URL, unreadable file).
    #[error("config: {0}")]
    Config(String),

    /// The requested chain is not part of the registry.
    #[error("unknown chain: {0}")]
    UnknownChain(String),

    /// Server bind or runtime error.
    #[error("server: {0}")]
    Server(String),
}

impl Error {
    /// Configuration error with a plain message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Configuration error that keeps the underlying cause in the message.
    pub fn config_with(context: impl AsRef<str>, source: impl std::fmt::Display) -> Self {
        Self::Config(format!("{}: {source}", context.as_ref()))
    }

    /// Lookup miss for a chain id or name.
    pub fn unknown_chain(chain: impl std::fmt::Display) -> Self {
        Self::UnknownChain(chain.to_string())
    }

    /// Server error with a plain message.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server(message.into())
    }
}
