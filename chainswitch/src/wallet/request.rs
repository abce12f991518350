//! EIP-3326 switch and EIP-3085 add-chain request payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::{ChainRecord, NATIVE_CURRENCY_DECIMALS};

/// EIP-3326 method name.
pub const SWITCH_CHAIN_METHOD: &str = "wallet_switchEthereumChain";

/// EIP-3085 method name.
pub const ADD_CHAIN_METHOD: &str = "wallet_addEthereumChain";

/// Parameters of `wallet_switchEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    /// Hex chain id, e.g. `0x89`.
    pub chain_id: String,
}

/// Native currency descriptor of an add-chain request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name; the registry uses the symbol.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Always 18 for registry chains.
    pub decimals: u8,
}

/// Parameters of `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// Hex chain id.
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Single registration endpoint.
    pub rpc_urls: Vec<String>,
    /// Explorer base URL; omitted when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer_urls: Option<Vec<String>>,
}

impl AddChainParams {
    /// Registration payload for `record`.
    #[must_use]
    pub fn from_record(record: &ChainRecord) -> Self {
        Self {
            chain_id: record.chain_id.to_hex(),
            chain_name: record.name.clone(),
            native_currency: NativeCurrency {
                name: record.native_currency_symbol.clone(),
                symbol: record.native_currency_symbol.clone(),
                decimals: NATIVE_CURRENCY_DECIMALS,
            },
            rpc_urls: record
                .registration_endpoint()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            block_explorer_urls: record
                .block_explorer_url
                .as_ref()
                .map(|url| vec![url.clone()]),
        }
    }
}

/// An EIP-1193 `request` argument: `{ method, params }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum WalletRequest {
    /// `wallet_switchEthereumChain`.
    #[serde(rename = "wallet_switchEthereumChain")]
    SwitchChain([SwitchChainParams; 1]),
    /// `wallet_addEthereumChain`.
    #[serde(rename = "wallet_addEthereumChain")]
    AddChain([AddChainParams; 1]),
}

impl WalletRequest {
    /// Switch request targeting `record`.
    #[must_use]
    pub fn switch_chain(record: &ChainRecord) -> Self {
        Self::SwitchChain([SwitchChainParams {
            chain_id: record.chain_id.to_hex(),
        }])
    }

    /// Add-chain request registering `record`.
    #[must_use]
    pub fn add_chain(record: &ChainRecord) -> Self {
        Self::AddChain([AddChainParams::from_record(record)])
    }

    /// JSON-RPC method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::SwitchChain(_) => SWITCH_CHAIN_METHOD,
            Self::AddChain(_) => ADD_CHAIN_METHOD,
        }
    }

    /// JSON-RPC params array.
    #[must_use]
    pub fn params(&self) -> Value {
        let params = match self {
            Self::SwitchChain(params) => serde_json::to_value(params),
            Self::AddChain(params) => serde_json::to_value(params),
        };
        params.unwrap_or_default()
    }
}

/// Both wallet requests for one chain, for callers that drive the wallet
/// themselves: try `switch`, and send `add` only on error code 4902.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRequests {
    /// Switch request.
    pub switch: WalletRequest,
    /// Registration request.
    pub add: WalletRequest,
}

impl NetworkRequests {
    /// Requests for `record`.
    #[must_use]
    pub fn for_record(record: &ChainRecord) -> Self {
        Self {
            switch: WalletRequest::switch_chain(record),
            add: WalletRequest::add_chain(record),
        }
    }
}
