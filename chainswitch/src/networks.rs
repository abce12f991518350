//! Query facade over the registry, read clients and the negotiator.
//!
//! [`Networks`] is what embedding applications and the HTTP service hold: it
//! owns the immutable [`ChainRegistry`], one [`FallbackClient`] per chain
//! sharing a single connection pool, and the [`Negotiator`] used for wallet
//! switches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::chain::{ChainId, ChainRegistry, ChainSelector};
use crate::error::Error;
use crate::rpc::{FallbackClient, RpcOptions};
use crate::wallet::{NetworkRequests, Negotiator, SwitchOutcome, WalletHandle, WalletProvider};

/// Registry-backed network services.
#[derive(Debug, Clone)]
pub struct Networks {
    registry: Arc<ChainRegistry>,
    clients: HashMap<ChainId, FallbackClient>,
    negotiator: Negotiator,
}

impl Networks {
    /// Builds read clients for every chain in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(registry: ChainRegistry, options: &RpcOptions) -> Result<Self, Error> {
        let http = options.http_client()?;
        let clients = registry
            .iter()
            .map(|record| {
                FallbackClient::build_with_client(&record.rpc_endpoints, &http)
                    .map(|client| (record.chain_id, client))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        let registry = Arc::new(registry);
        tracing::debug!(chains = clients.len(), timeout = ?options.timeout, "read clients ready");
        Ok(Self {
            negotiator: Negotiator::new(Arc::clone(&registry)),
            registry,
            clients,
        })
    }

    /// Services over the built-in chain table with default RPC options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the built-in table is invalid or the HTTP
    /// client cannot be built.
    pub fn builtin() -> Result<Self, Error> {
        Self::new(ChainRegistry::builtin()?, &RpcOptions::default())
    }

    /// Abandons wallet negotiations that take longer than `timeout`.
    #[must_use]
    pub fn with_wallet_timeout(mut self, timeout: Duration) -> Self {
        self.negotiator = self.negotiator.with_timeout(timeout);
        self
    }

    /// The chain registry.
    #[must_use]
    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// The wallet negotiator.
    #[must_use]
    pub const fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    /// Display name for `chain_id`, or `"Unsupported Network"`.
    #[must_use]
    pub fn resolve_chain_name(&self, chain_id: ChainId) -> &str {
        self.registry.resolve_chain_name(chain_id)
    }

    /// Failover read client for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChain`] if the chain is not in the registry.
    pub fn get_read_client(&self, chain_id: ChainId) -> Result<FallbackClient, Error> {
        self.clients
            .get(&chain_id)
            .cloned()
            .ok_or_else(|| Error::unknown_chain(chain_id))
    }

    /// Switch and add payloads for a chain, for callers that drive their own
    /// wallet. `None` if the selector names no registry chain.
    #[must_use]
    pub fn wallet_requests(&self, selector: &ChainSelector) -> Option<NetworkRequests> {
        self.registry.find(selector).map(NetworkRequests::for_record)
    }

    /// Moves `wallet` onto the selected chain, adding it to the wallet first
    /// when the wallet does not recognise it.
    pub async fn switch_or_add_network<W: WalletProvider>(
        &self,
        wallet: Option<&WalletHandle<W>>,
        selector: &ChainSelector,
    ) -> SwitchOutcome {
        self.negotiator.negotiate(wallet, selector).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainRecord, UNSUPPORTED_NETWORK};
    use crate::wallet::SwitchFailure;
    use crate::wallet::WalletRequest;

    fn networks() -> Networks {
        let registry = ChainRegistry::new([
            ChainRecord::new(137, "Polygon", "MATIC", ["https://rpc.a", "https://rpc.b"]),
            ChainRecord::new(10, "Optimism", "ETH", ["https://mainnet.optimism.io"]),
        ])
        .unwrap();
        Networks::new(registry, &RpcOptions::default()).unwrap()
    }

    #[test]
    fn resolves_names_with_sentinel() {
        let networks = networks();
        assert_eq!(networks.resolve_chain_name(ChainId(137)), "Polygon");
        assert_eq!(networks.resolve_chain_name(ChainId(3)), UNSUPPORTED_NETWORK);
    }

    #[test]
    fn read_client_follows_endpoint_order() {
        let client = networks().get_read_client(ChainId(137)).unwrap();
        assert_eq!(client.endpoints().collect::<Vec<_>>(), ["https://rpc.a", "https://rpc.b"]);
        assert_eq!(client.quorum(), 1);
    }

    #[test]
    fn read_client_for_unknown_chain_is_an_error() {
        assert!(matches!(
            networks().get_read_client(ChainId(3)),
            Err(Error::UnknownChain(_))
        ));
    }

    #[test]
    fn wallet_requests_use_registration_endpoint() {
        let requests = networks()
            .wallet_requests(&ChainSelector::from("Polygon"))
            .unwrap();
        assert_eq!(requests.switch, WalletRequest::switch_chain(
            &ChainRecord::new(137, "Polygon", "MATIC", ["https://rpc.a"]),
        ));
        assert_eq!(requests.add.params()[0]["rpcUrls"][0], "https://rpc.b");
        assert!(networks().wallet_requests(&ChainSelector::Id(ChainId(3))).is_none());
    }

    #[tokio::test]
    async fn switching_without_wallet_fails() {
        let none: Option<&WalletHandle<crate::wallet::HttpWallet>> = None;
        let outcome = networks()
            .switch_or_add_network(none, &ChainSelector::Id(ChainId(10)))
            .await;
        assert_eq!(outcome, SwitchOutcome::Failed(SwitchFailure::NoWallet));
    }

    #[test]
    fn builtin_services_cover_every_chain() {
        let networks = Networks::builtin().unwrap();
        for id in networks.registry().ids() {
            assert!(networks.get_read_client(id).is_ok());
        }
    }
}
