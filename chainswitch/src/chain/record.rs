//! Chain identifiers and per-chain metadata records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// CAIP-2 namespace for EVM chains.
pub const EIP155_NAMESPACE: &str = "eip155";

/// Decimals of every native currency in the registry.
pub const NATIVE_CURRENCY_DECIMALS: u8 = 18;

/// Numeric EIP-155 chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Hex form used by wallet requests: `0x`-prefixed, lowercase, unpadded.
    ///
    /// ```
    /// use chainswitch::chain::ChainId;
    /// assert_eq!(ChainId(137).to_hex(), "0x89");
    /// ```
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }

    /// CAIP-2 form, e.g. `eip155:137`.
    #[must_use]
    pub fn to_caip2(self) -> String {
        format!("{EIP155_NAMESPACE}:{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses `137`, `0x89` or `eip155:137`.
impl FromStr for ChainId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if let Some(reference) = s.strip_prefix("eip155:") {
            reference.parse::<u64>().ok()
        } else if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16).ok()
        } else {
            s.parse::<u64>().ok()
        };
        parsed
            .map(Self)
            .ok_or_else(|| Error::config(format!("invalid chain id '{s}'")))
    }
}

/// How a caller names a target chain: by id or by exact display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChainSelector {
    /// Numeric chain id.
    Id(ChainId),
    /// Exact, case-sensitive display name.
    Name(String),
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

impl From<ChainId> for ChainSelector {
    fn from(id: ChainId) -> Self {
        Self::Id(id)
    }
}

impl From<u64> for ChainSelector {
    fn from(id: u64) -> Self {
        Self::Id(ChainId(id))
    }
}

impl From<&str> for ChainSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

/// Anything that parses as a [`ChainId`] is an id; everything else is a name.
impl FromStr for ChainSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_input(s))
    }
}

impl ChainSelector {
    /// Interprets user input: decimal, hex or CAIP-2 ids select by id, any
    /// other text selects by name.
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        input
            .parse::<ChainId>()
            .map_or_else(|_| Self::Name(input.to_owned()), Self::Id)
    }
}

/// Descriptive metadata for one supported network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    /// Primary key.
    pub chain_id: ChainId,
    /// Display name, also usable as a lookup key.
    pub name: String,
    /// Native currency ticker, e.g. `ETH`.
    pub native_currency_symbol: String,
    /// Ordered, non-empty RPC endpoint list. Serialised redacted to
    /// scheme and host.
    #[serde(serialize_with = "super::endpoints::serialize_redacted")]
    pub rpc_endpoints: Vec<String>,
    /// Block explorer base URL, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_explorer_url: Option<String>,
}

impl ChainRecord {
    /// Creates a record. Validation happens when the record enters a
    /// [`ChainRegistry`](super::ChainRegistry).
    pub fn new(
        chain_id: u64,
        name: impl Into<String>,
        native_currency_symbol: impl Into<String>,
        rpc_endpoints: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            chain_id: ChainId(chain_id),
            name: name.into(),
            native_currency_symbol: native_currency_symbol.into(),
            rpc_endpoints: rpc_endpoints.into_iter().map(Into::into).collect(),
            block_explorer_url: None,
        }
    }

    /// Sets the block explorer base URL.
    #[must_use]
    pub fn with_explorer(mut self, url: impl Into<String>) -> Self {
        self.block_explorer_url = Some(url.into());
        self
    }

    /// Native currency decimals; fixed for every registry entry.
    #[must_use]
    pub const fn native_currency_decimals(&self) -> u8 {
        NATIVE_CURRENCY_DECIMALS
    }
}
