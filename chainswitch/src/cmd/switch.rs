//! `chainswitch switch` command — negotiate a network switch with an HTTP
//! JSON-RPC wallet.

use std::path::Path;
use std::time::Duration;

use chainswitch::chain::ChainSelector;
use chainswitch::error::Error;
use chainswitch::rpc::RpcOptions;
use chainswitch::signal::SigDown;
use chainswitch::wallet::{HttpWallet, SwitchOutcome, WalletHandle};

/// Per-request HTTP timeout when no wallet timeout is configured; covers the
/// time a user spends on the wallet prompt.
const DEFAULT_WALLET_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Execute the `switch` command and report the outcome.
///
/// Ctrl+C while the wallet prompt is open abandons the exchange.
///
/// # Errors
///
/// Returns an error if the configuration or wallet URL is invalid. Wallet
/// refusals are outcomes, not errors.
#[allow(clippy::print_stdout)]
pub async fn run(
    config: Option<&Path>,
    wallet_url: &str,
    chain: &str,
) -> Result<SwitchOutcome, Error> {
    let config = super::load(config)?;
    let networks = config.networks()?;

    let options = RpcOptions {
        timeout: config
            .wallet_timeout()
            .unwrap_or(DEFAULT_WALLET_REQUEST_TIMEOUT),
    };
    let wallet = WalletHandle::new(HttpWallet::new(wallet_url, &options)?);
    let target = ChainSelector::from_input(chain);

    let sig_down = SigDown::try_new().map_err(|e| Error::server(e.to_string()))?;
    let outcome = networks
        .negotiator()
        .negotiate_with_cancel(Some(&wallet), &target, &sig_down.cancellation_token())
        .await;
    sig_down.close().await;

    let name = networks
        .registry()
        .find(&target)
        .map_or_else(|| target.to_string(), |record| record.name.clone());
    match &outcome {
        SwitchOutcome::Switched => println!("switched to {name}"),
        SwitchOutcome::Added => println!("added and switched to {name}"),
        SwitchOutcome::Rejected(error) => println!("user rejected adding {name}: {error}"),
        SwitchOutcome::Failed(failure) => println!("switch to {name} failed: {failure}"),
    }
    Ok(outcome)
}
