//! EVM chain registry, failover RPC clients and wallet network negotiation.
//!
//! - [`chain`] — the immutable [`ChainRegistry`](chain::ChainRegistry), the
//!   built-in chain table and its TOML form.
//! - [`rpc`] — [`FallbackClient`](rpc::FallbackClient), a JSON-RPC client
//!   that fails over across a chain's endpoints in order.
//! - [`wallet`] — the switch-then-add [`Negotiator`](wallet::Negotiator)
//!   for EIP-1193 wallets.
//! - [`networks`] — the [`Networks`](networks::Networks) facade tying the
//!   three together.
//!
//! The remaining modules back the `chainswitch` binary: configuration, the
//! HTTP query service, shutdown signalling and telemetry.

pub mod chain;
pub mod config;
pub mod error;
pub mod networks;
pub mod routes;
pub mod rpc;
pub mod signal;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod wallet;

use tracing_subscriber::EnvFilter;

/// Installs a console subscriber writing to stderr, filtered by `RUST_LOG`
/// or `default_filter`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_console_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
