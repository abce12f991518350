//! Read-only RPC access with ordered endpoint failover.
//!
//! - `transport` — JSON-RPC message types, the [`RpcTransport`] seam and the
//!   reqwest-backed [`HttpTransport`].
//! - `fallback` — [`FallbackClient`], which composes transports into one
//!   logical client with a quorum of one.

mod fallback;
mod transport;

pub use self::fallback::*;
pub use self::transport::*;
