//! Immutable chain registry with load-time validation.

use std::collections::{HashMap, HashSet};

use url::Url;

use super::builtin::BUILTIN_CHAINS;
use super::record::{ChainId, ChainRecord, ChainSelector};
use crate::error::Error;

/// Name returned for chain ids that are not in the registry.
pub const UNSUPPORTED_NETWORK: &str = "Unsupported Network";

/// Currency symbol reported for chain ids that are not in the registry.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "ETH";

/// Lookup table of supported chains.
///
/// Built once from a list of [`ChainRecord`]s and never mutated afterwards.
/// Construction rejects duplicate chain ids, empty endpoint lists and
/// malformed URLs so that a bad table aborts startup instead of producing
/// ambiguous lookups later.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    records: Vec<ChainRecord>,
    by_id: HashMap<ChainId, usize>,
}

impl ChainRegistry {
    /// Validates `records` and builds the registry. Table order is kept for
    /// iteration and for name lookups.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if two records share a chain id, a chain id
    /// is zero, an endpoint list is empty, or any URL fails to parse.
    pub fn new(records: impl IntoIterator<Item = ChainRecord>) -> Result<Self, Error> {
        let records: Vec<ChainRecord> = records.into_iter().collect();
        let mut by_id = HashMap::with_capacity(records.len());
        let mut names = HashSet::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            validate_record(record)?;
            if by_id.insert(record.chain_id, index).is_some() {
                return Err(Error::config(format!(
                    "duplicate chain id {} ('{}')",
                    record.chain_id, record.name
                )));
            }
            if !names.insert(record.name.as_str()) {
                tracing::warn!(
                    chain_id = %record.chain_id,
                    name = %record.name,
                    "duplicate chain name, lookups by name resolve to the first entry"
                );
            }
        }

        tracing::info!(chains = records.len(), "chain registry loaded");
        Ok(Self { records, by_id })
    }

    /// Registry over the chain table compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the built-in table violates a registry
    /// invariant.
    pub fn builtin() -> Result<Self, Error> {
        Self::new(BUILTIN_CHAINS.iter().map(super::builtin::BuiltinChain::to_record))
    }

    /// Record for `chain_id`, if supported.
    #[must_use]
    pub fn find_by_id(&self, chain_id: ChainId) -> Option<&ChainRecord> {
        self.by_id
            .get(&chain_id)
            .map(|&index| &self.records[index])
    }

    /// Record whose display name equals `name` exactly.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ChainRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Record addressed by id or by name.
    #[must_use]
    pub fn find(&self, selector: &ChainSelector) -> Option<&ChainRecord> {
        match selector {
            ChainSelector::Id(id) => self.find_by_id(*id),
            ChainSelector::Name(name) => self.find_by_name(name),
        }
    }

    /// Display name for `chain_id`, or [`UNSUPPORTED_NETWORK`].
    pub fn resolve_chain_name(&self, chain_id: ChainId) -> &str {
        self.find_by_id(chain_id)
            .map_or(UNSUPPORTED_NETWORK, |record| record.name.as_str())
    }

    /// Native currency symbol for `chain_id`, or [`DEFAULT_CURRENCY_SYMBOL`].
    pub fn native_currency_symbol(&self, chain_id: ChainId) -> &str {
        self.find_by_id(chain_id).map_or(DEFAULT_CURRENCY_SYMBOL, |record| {
            record.native_currency_symbol.as_str()
        })
    }

    /// Block explorer base URL for `chain_id`, when both are known.
    pub fn explorer_url(&self, chain_id: ChainId) -> Option<&str> {
        self.find_by_id(chain_id)
            .and_then(|record| record.block_explorer_url.as_deref())
    }

    /// Whether `chain_id` is in the registry.
    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.by_id.contains_key(&chain_id)
    }

    /// Chain ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.records.iter().map(|record| record.chain_id)
    }

    /// Display names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|record| record.name.as_str())
    }

    /// All records in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChainRecord> {
        self.records.iter()
    }

    /// Number of chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry has no chains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ChainRegistry {
    type Item = &'a ChainRecord;
    type IntoIter = std::slice::Iter<'a, ChainRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate_record(record: &ChainRecord) -> Result<(), Error> {
    if record.chain_id.get() == 0 {
        return Err(Error::config(format!(
            "chain '{}' has chain id 0",
            record.name
        )));
    }
    if record.rpc_endpoints.is_empty() {
        return Err(Error::config(format!(
            "chain {} ('{}') has no RPC endpoints",
            record.chain_id, record.name
        )));
    }
    for endpoint in &record.rpc_endpoints {
        validate_url(endpoint).map_err(|e| {
            Error::config_with(
                format!("chain {} RPC endpoint '{endpoint}'", record.chain_id),
                e,
            )
        })?;
    }
    if let Some(explorer) = &record.block_explorer_url {
        validate_url(explorer).map_err(|e| {
            Error::config_with(
                format!("chain {} explorer URL '{explorer}'", record.chain_id),
                e,
            )
        })?;
    }
    Ok(())
}

fn validate_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}
