//! Switch-or-add negotiation against a connected wallet.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::provider::{WalletError, WalletHandle, WalletProvider};
use super::request::WalletRequest;
use crate::chain::{ChainRecord, ChainRegistry, ChainSelector};

/// Result of one negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The wallet accepted the switch.
    Switched,
    /// The wallet did not know the chain and accepted registering it.
    Added,
    /// The user declined registering the chain.
    Rejected(WalletError),
    /// The exchange did not complete.
    Failed(SwitchFailure),
}

impl SwitchOutcome {
    /// Whether the wallet now targets the requested chain.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Switched | Self::Added)
    }
}

/// Why a negotiation failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwitchFailure {
    /// The selector names no registry chain; the wallet was not contacted.
    #[error("unknown chain: {0}")]
    UnknownChain(ChainSelector),
    /// No wallet is connected.
    #[error("no wallet connected")]
    NoWallet,
    /// Another negotiation is already running on this wallet.
    #[error("a network switch is already in progress")]
    Busy,
    /// Cancelled or timed out while waiting for the wallet.
    #[error("network switch abandoned")]
    Abandoned,
    /// The wallet returned an error that ends the exchange.
    #[error(transparent)]
    Wallet(WalletError),
}

/// Drives the two-step switch/add exchange for registry chains.
#[derive(Debug, Clone)]
pub struct Negotiator {
    registry: Arc<ChainRegistry>,
    timeout: Option<Duration>,
}

impl Negotiator {
    /// Negotiator over `registry` with no timeout.
    #[must_use]
    pub const fn new(registry: Arc<ChainRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Abandons an exchange that has not finished within `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Registry used to resolve targets.
    #[must_use]
    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Moves `wallet` onto `target`, registering the chain first if the
    /// wallet does not know it.
    pub async fn negotiate<W: WalletProvider>(
        &self,
        wallet: Option<&WalletHandle<W>>,
        target: &ChainSelector,
    ) -> SwitchOutcome {
        self.negotiate_with_cancel(wallet, target, &CancellationToken::new())
            .await
    }

    /// Like [`negotiate`](Self::negotiate), but gives up with
    /// [`SwitchFailure::Abandoned`] once `cancel` fires.
    pub async fn negotiate_with_cancel<W: WalletProvider>(
        &self,
        wallet: Option<&WalletHandle<W>>,
        target: &ChainSelector,
        cancel: &CancellationToken,
    ) -> SwitchOutcome {
        let Some(record) = self.registry.find(target) else {
            tracing::warn!(chain = %target, "refusing to switch to unknown chain");
            return SwitchOutcome::Failed(SwitchFailure::UnknownChain(target.clone()));
        };
        let Some(wallet) = wallet else {
            tracing::warn!(chain_id = %record.chain_id, "no wallet connected");
            return SwitchOutcome::Failed(SwitchFailure::NoWallet);
        };
        let Some(_in_flight) = wallet.try_begin() else {
            tracing::warn!(chain_id = %record.chain_id, "network switch already in progress");
            return SwitchOutcome::Failed(SwitchFailure::Busy);
        };

        let pending = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, exchange(wallet.provider(), record))
                    .await
                    .unwrap_or_else(|_| {
                        tracing::warn!(chain_id = %record.chain_id, ?limit, "wallet did not answer in time");
                        SwitchOutcome::Failed(SwitchFailure::Abandoned)
                    }),
                None => exchange(wallet.provider(), record).await,
            }
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::info!(chain_id = %record.chain_id, "network switch cancelled");
                SwitchOutcome::Failed(SwitchFailure::Abandoned)
            }
            outcome = pending => outcome,
        };
        tracing::info!(chain_id = %record.chain_id, ?outcome, "network switch finished");
        outcome
    }
}

async fn exchange<W: WalletProvider>(wallet: &W, record: &ChainRecord) -> SwitchOutcome {
    let switch = WalletRequest::switch_chain(record);
    tracing::debug!(chain_id = %record.chain_id, hex = %record.chain_id.to_hex(), "requesting switch");
    match wallet.request(&switch).await {
        Ok(_) => return SwitchOutcome::Switched,
        Err(error) if error.is_unrecognized_chain() => {
            tracing::debug!(chain_id = %record.chain_id, "wallet does not know chain, registering it");
        }
        Err(error) => return SwitchOutcome::Failed(SwitchFailure::Wallet(error)),
    }

    let add = WalletRequest::add_chain(record);
    match wallet.request(&add).await {
        Ok(_) => SwitchOutcome::Added,
        Err(error) if error.is_user_rejected() => SwitchOutcome::Rejected(error),
        Err(error) => SwitchOutcome::Failed(SwitchFailure::Wallet(error)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::chain::ChainId;
    use crate::wallet::{ADD_CHAIN_METHOD, SWITCH_CHAIN_METHOD};

    /// Answers from a script and records every request it sees.
    #[derive(Default)]
    struct ScriptedWallet {
        replies: Mutex<VecDeque<Result<Value, WalletError>>>,
        seen: Mutex<Vec<WalletRequest>>,
    }

    impl ScriptedWallet {
        fn replying(replies: impl IntoIterator<Item = Result<Value, WalletError>>) -> WalletHandle<Self> {
            WalletHandle::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
                seen: Mutex::default(),
            })
        }

        fn seen(&self) -> Vec<WalletRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WalletProvider for ScriptedWallet {
        async fn request(&self, request: &WalletRequest) -> Result<Value, WalletError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(WalletError::Transport("script exhausted".to_owned())))
        }
    }

    /// Never answers.
    struct SilentWallet;

    #[async_trait]
    impl WalletProvider for SilentWallet {
        async fn request(&self, _request: &WalletRequest) -> Result<Value, WalletError> {
            std::future::pending().await
        }
    }

    fn registry() -> Arc<ChainRegistry> {
        Arc::new(
            ChainRegistry::new([
                ChainRecord::new(137, "Polygon Mainnet", "MATIC", ["https://rpc.a", "https://rpc.b"])
                    .with_explorer("https://polygonscan.com"),
                ChainRecord::new(421_613, "Arbitrum Goerli Testnet", "ETH", [
                    "https://goerli-rollup.arbitrum.io/rpc",
                ]),
            ])
            .unwrap(),
        )
    }

    fn polygon() -> ChainSelector {
        ChainSelector::Id(ChainId(137))
    }

    fn unrecognized() -> Result<Value, WalletError> {
        Err(WalletError::rpc(4902, "Unrecognized chain ID"))
    }

    fn rejected() -> Result<Value, WalletError> {
        Err(WalletError::rpc(4001, "User rejected the request"))
    }

    #[tokio::test]
    async fn known_chain_switches_without_adding() {
        let wallet = ScriptedWallet::replying([Ok(Value::Null)]);
        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &polygon()).await;

        assert_eq!(outcome, SwitchOutcome::Switched);
        let seen = wallet.provider().seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method(), SWITCH_CHAIN_METHOD);
        assert_eq!(seen[0].params(), json!([{"chainId": "0x89"}]));
    }

    #[tokio::test]
    async fn unrecognized_chain_is_added_with_registration_endpoint() {
        let wallet = ScriptedWallet::replying([unrecognized(), Ok(Value::Null)]);
        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &polygon()).await;

        assert_eq!(outcome, SwitchOutcome::Added);
        let seen = wallet.provider().seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].method(), ADD_CHAIN_METHOD);
        assert_eq!(
            seen[1].params(),
            json!([{
                "chainId": "0x89",
                "chainName": "Polygon Mainnet",
                "nativeCurrency": {"name": "MATIC", "symbol": "MATIC", "decimals": 18},
                "rpcUrls": ["https://rpc.b"],
                "blockExplorerUrls": ["https://polygonscan.com"]
            }])
        );
    }

    #[tokio::test]
    async fn add_request_omits_missing_explorer() {
        let wallet = ScriptedWallet::replying([unrecognized(), Ok(Value::Null)]);
        let target = ChainSelector::from("Arbitrum Goerli Testnet");
        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &target).await;

        assert_eq!(outcome, SwitchOutcome::Added);
        let params = wallet.provider().seen()[1].params();
        assert_eq!(params[0]["chainId"], "0x66eed");
        assert!(params[0].get("blockExplorerUrls").is_none());
    }

    #[tokio::test]
    async fn declined_registration_is_rejected() {
        let wallet = ScriptedWallet::replying([unrecognized(), rejected()]);
        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &polygon()).await;

        assert!(matches!(outcome, SwitchOutcome::Rejected(ref e) if e.code() == Some(4001)));
        assert_eq!(wallet.provider().seen().len(), 2);
    }

    #[tokio::test]
    async fn other_add_errors_fail() {
        let wallet = ScriptedWallet::replying([
            unrecognized(),
            Err(WalletError::rpc(-32603, "Internal error")),
        ]);
        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &polygon()).await;

        assert!(matches!(
            outcome,
            SwitchOutcome::Failed(SwitchFailure::Wallet(ref e)) if e.code() == Some(-32603)
        ));
    }

    #[tokio::test]
    async fn switch_errors_other_than_unrecognized_never_add() {
        let wallet = ScriptedWallet::replying([rejected()]);
        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &polygon()).await;

        assert!(matches!(outcome, SwitchOutcome::Failed(SwitchFailure::Wallet(_))));
        assert_eq!(wallet.provider().seen().len(), 1);
    }

    #[tokio::test]
    async fn unknown_chain_never_reaches_the_wallet() {
        let wallet = ScriptedWallet::replying([Ok(Value::Null)]);
        let target = ChainSelector::Id(ChainId(3));
        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &target).await;

        assert_eq!(outcome, SwitchOutcome::Failed(SwitchFailure::UnknownChain(target)));
        assert!(wallet.provider().seen().is_empty());
    }

    #[tokio::test]
    async fn missing_wallet_fails_after_lookup() {
        let negotiator = Negotiator::new(registry());
        let none: Option<&WalletHandle<ScriptedWallet>> = None;

        assert_eq!(
            negotiator.negotiate(none, &polygon()).await,
            SwitchOutcome::Failed(SwitchFailure::NoWallet)
        );
        assert!(matches!(
            negotiator.negotiate(none, &ChainSelector::from("Nowhere")).await,
            SwitchOutcome::Failed(SwitchFailure::UnknownChain(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_negotiation_is_busy() {
        let wallet = ScriptedWallet::replying([Ok(Value::Null)]);
        let _held = wallet.try_begin().unwrap();
        assert!(wallet.is_busy());

        let outcome = Negotiator::new(registry()).negotiate(Some(&wallet), &polygon()).await;

        assert_eq!(outcome, SwitchOutcome::Failed(SwitchFailure::Busy));
        assert!(wallet.provider().seen().is_empty());
    }

    #[tokio::test]
    async fn guard_is_released_after_negotiation() {
        let wallet = ScriptedWallet::replying([Ok(Value::Null), Ok(Value::Null)]);
        let negotiator = Negotiator::new(registry());

        assert!(negotiator.negotiate(Some(&wallet), &polygon()).await.is_success());
        assert!(!wallet.is_busy());
        assert!(negotiator.negotiate(Some(&wallet), &polygon()).await.is_success());
    }

    #[tokio::test]
    async fn cancellation_abandons_pending_exchange() {
        let wallet = WalletHandle::new(SilentWallet);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = Negotiator::new(registry())
            .negotiate_with_cancel(Some(&wallet), &polygon(), &cancel)
            .await;

        assert_eq!(outcome, SwitchOutcome::Failed(SwitchFailure::Abandoned));
        assert!(!wallet.is_busy());
    }

    #[tokio::test]
    async fn timeout_abandons_pending_exchange() {
        let wallet = WalletHandle::new(SilentWallet);
        let outcome = Negotiator::new(registry())
            .with_timeout(Duration::from_millis(20))
            .negotiate(Some(&wallet), &polygon())
            .await;

        assert_eq!(outcome, SwitchOutcome::Failed(SwitchFailure::Abandoned));
    }
}
