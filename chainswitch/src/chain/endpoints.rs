//! RPC endpoint selection and display.
//!
//! The first endpoint of a chain serves read traffic. Wallet registration uses
//! the second endpoint when the table provides one, so a chain can offer a
//! load-balanced aggregator for reads and a conservative public RPC as the
//! wallet default.
//!
//! Endpoints are shown outside the process only through [`redact_endpoint`]:
//! provider API keys live in the path, query or userinfo of the URL, and
//! `$VAR` table entries exist precisely to keep them out of the config file.

use serde::Serializer;
use url::Url;

use super::record::{ChainId, ChainRecord};
use super::registry::ChainRegistry;

/// Stand-in for an endpoint that does not parse as a URL with a host.
pub const REDACTED_ENDPOINT: &str = "<redacted>";

/// Scheme, host and port of `endpoint`.
///
/// ```
/// use chainswitch::chain::redact_endpoint;
/// assert_eq!(
///     redact_endpoint("https://user:pw@polygon-mainnet.infura.io/v3/abc?key=1"),
///     "https://polygon-mainnet.infura.io"
/// );
/// ```
#[must_use]
pub fn redact_endpoint(endpoint: &str) -> String {
    match Url::parse(endpoint) {
        Ok(url) if url.has_host() => url.origin().ascii_serialization(),
        _ => REDACTED_ENDPOINT.to_owned(),
    }
}

pub(crate) fn serialize_redacted<S: Serializer>(
    endpoints: &[String],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(endpoints.iter().map(|endpoint| redact_endpoint(endpoint)))
}

impl ChainRecord {
    /// Endpoint used for outbound read calls (`rpc_endpoints[0]`).
    ///
    /// `None` only for a hand-built record with no endpoints; records from a
    /// [`ChainRegistry`] always have one.
    #[must_use]
    pub fn primary_endpoint(&self) -> Option<&str> {
        self.rpc_endpoints.first().map(String::as_str)
    }

    /// Endpoint offered to wallets when registering the chain
    /// (`rpc_endpoints[1]`, falling back to `rpc_endpoints[0]`).
    #[must_use]
    pub fn registration_endpoint(&self) -> Option<&str> {
        self.rpc_endpoints
            .get(1)
            .or_else(|| self.rpc_endpoints.first())
            .map(String::as_str)
    }
}

impl ChainRegistry {
    /// Primary endpoint of `chain_id`, if the chain is supported.
    #[must_use]
    pub fn primary_endpoint(&self, chain_id: ChainId) -> Option<&str> {
        self.find_by_id(chain_id)
            .and_then(ChainRecord::primary_endpoint)
    }

    /// Registration endpoint of `chain_id`, if the chain is supported.
    #[must_use]
    pub fn registration_endpoint(&self, chain_id: ChainId) -> Option<&str> {
        self.find_by_id(chain_id)
            .and_then(ChainRecord::registration_endpoint)
    }
}
