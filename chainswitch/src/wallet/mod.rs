//! Wallet network negotiation.
//!
//! - `request` — EIP-3326 / EIP-3085 payloads ([`WalletRequest`]).
//! - `provider` — the [`WalletProvider`] seam, [`WalletError`] and the
//!   single-flight [`WalletHandle`].
//! - `negotiator` — the switch-then-add state machine ([`Negotiator`]).
//! - `http` — [`HttpWallet`], a provider speaking JSON-RPC over HTTP.

mod http;
mod negotiator;
mod provider;
mod request;

pub use self::http::*;
pub use self::negotiator::*;
pub use self::provider::*;
pub use self::request::*;
