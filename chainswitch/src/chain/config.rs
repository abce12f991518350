//! Chain table configuration and CAIP-2 keyed TOML (de)serialisation.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::record::{ChainId, ChainRecord, EIP155_NAMESPACE};
use super::registry::ChainRegistry;
use crate::error::Error;

/// Per-chain TOML table.
///
/// ```toml
/// [chains."eip155:137"]
/// name = "Polygon"
/// currency = "MATIC"
/// rpc = ["https://rpc.ankr.com/polygon", "https://polygon-rpc.com"]
/// explorer = "https://polygonscan.com"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfigInner {
    /// Display name.
    pub name: String,
    /// Native currency symbol.
    pub currency: String,
    /// RPC endpoints in failover order. Entries may be `$VAR` / `${VAR}`
    /// environment references.
    pub rpc: Vec<String>,
    /// Block explorer base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer: Option<String>,
}

/// One chain entry together with the id parsed from its CAIP-2 key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Numeric chain id taken from the table key.
    pub chain_id: ChainId,
    /// TOML-level configuration.
    pub inner: ChainConfigInner,
}

impl ChainConfig {
    /// Converts the entry into a [`ChainRecord`], resolving environment
    /// references in the RPC list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a referenced environment variable is unset.
    pub fn to_record(&self) -> Result<ChainRecord, Error> {
        let rpc = self
            .inner
            .rpc
            .iter()
            .map(|endpoint| resolve_env(endpoint))
            .collect::<Result<Vec<_>, _>>()?;
        let record = ChainRecord::new(
            self.chain_id.get(),
            self.inner.name.clone(),
            self.inner.currency.clone(),
            rpc,
        );
        Ok(match &self.inner.explorer {
            Some(explorer) => record.with_explorer(explorer.clone()),
            None => record,
        })
    }
}

impl From<&ChainRecord> for ChainConfig {
    fn from(record: &ChainRecord) -> Self {
        Self {
            chain_id: record.chain_id,
            inner: ChainConfigInner {
                name: record.name.clone(),
                currency: record.native_currency_symbol.clone(),
                rpc: record.rpc_endpoints.clone(),
                explorer: record.block_explorer_url.clone(),
            },
        }
    }
}

/// Ordered collection of [`ChainConfig`] entries.
///
/// Serialised as a TOML map keyed by CAIP-2 chain identifiers
/// (`"eip155:<id>"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainsConfig(pub Vec<ChainConfig>);

impl Deref for ChainsConfig {
    type Target = Vec<ChainConfig>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ChainsConfig {
    /// Configuration entries mirroring an existing registry.
    #[must_use]
    pub fn from_registry(registry: &ChainRegistry) -> Self {
        Self(registry.iter().map(ChainConfig::from).collect())
    }

    /// Builds the registry described by this table, or the built-in registry
    /// when the table is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on unresolved environment references or any
    /// registry invariant violation.
    pub fn to_registry(&self) -> Result<ChainRegistry, Error> {
        if self.is_empty() {
            tracing::info!("no chains configured, using the built-in chain table");
            return ChainRegistry::builtin();
        }
        let records = self
            .iter()
            .map(ChainConfig::to_record)
            .collect::<Result<Vec<_>, _>>()?;
        ChainRegistry::new(records)
    }
}

impl Serialize for ChainsConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for chain in &self.0 {
            map.serialize_entry(&chain.chain_id.to_caip2(), &chain.inner)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChainsConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use std::fmt;

        use serde::de::{MapAccess, Visitor};

        struct ChainsVisitor;

        impl<'de> Visitor<'de> for ChainsVisitor {
            type Value = ChainsConfig;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of CAIP-2 chain identifiers to chain configurations")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut chains = Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some(key) = access.next_key::<String>()? {
                    let chain_id = parse_caip2(&key).map_err(serde::de::Error::custom)?;
                    let inner: ChainConfigInner = access.next_value()?;
                    chains.push(ChainConfig { chain_id, inner });
                }

                Ok(ChainsConfig(chains))
            }
        }

        deserializer.deserialize_map(ChainsVisitor)
    }
}

fn parse_caip2(key: &str) -> Result<ChainId, String> {
    let (namespace, reference) = key
        .split_once(':')
        .ok_or_else(|| format!("chain key '{key}' is not a CAIP-2 identifier"))?;
    if namespace != EIP155_NAMESPACE {
        return Err(format!("Unexpected namespace: {namespace}"));
    }
    reference
        .parse::<u64>()
        .map(ChainId)
        .map_err(|e| format!("invalid chain reference in '{key}': {e}"))
}

/// Resolve an environment-variable reference (`$VAR` or `${VAR}`), returning
/// the literal string unchanged if it does not match either pattern.
fn resolve_env(value: &str) -> Result<String, Error> {
    let var_name = if let Some(name) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(name)
    } else {
        value
            .strip_prefix('$')
            .filter(|name| !name.is_empty())
            .filter(|name| name.chars().all(|c| c.is_alphanumeric() || c == '_'))
    };
    match var_name {
        Some(name) => std::env::var(name).map_err(|_| {
            Error::config(format!(
                "env var '{name}' not found (referenced as '{value}')"
            ))
        }),
        None => Ok(value.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Wrapper {
        #[serde(default)]
        chains: ChainsConfig,
    }

    #[test]
    fn parses_caip2_keyed_tables() {
        let wrapper: Wrapper = toml::from_str(
            r#"
            [chains."eip155:137"]
            name = "Polygon"
            currency = "MATIC"
            rpc = ["https://rpc.a", "https://rpc.b"]
            explorer = "https://polygonscan.com"

            [chains."eip155:421613"]
            name = "Arbitrum Goerli Testnet"
            currency = "ETH"
            rpc = ["https://goerli-rollup.arbitrum.io/rpc"]
            "#,
        )
        .unwrap();

        let registry = wrapper.chains.to_registry().unwrap();
        assert_eq!(registry.len(), 2);
        let polygon = registry.find_by_id(ChainId(137)).unwrap();
        assert_eq!(polygon.registration_endpoint(), Some("https://rpc.b"));
        assert_eq!(registry.explorer_url(ChainId(421_613)), None);
    }

    #[test]
    fn rejects_foreign_namespaces() {
        let err = toml::from_str::<Wrapper>(
            r#"
            [chains."solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1"]
            name = "Solana"
            currency = "SOL"
            rpc = ["https://api.devnet.solana.com"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unexpected namespace: solana"));
    }

    #[test]
    fn equivalent_keys_are_duplicate_chain_ids() {
        let wrapper: Wrapper = toml::from_str(
            r#"
            [chains."eip155:10"]
            name = "Optimism"
            currency = "ETH"
            rpc = ["https://one"]

            [chains."eip155:010"]
            name = "Optimism Again"
            currency = "ETH"
            rpc = ["https://two"]
            "#,
        )
        .unwrap();
        assert!(matches!(wrapper.chains.to_registry(), Err(Error::Config(_))));
    }

    #[test]
    fn empty_table_falls_back_to_builtin() {
        let wrapper: Wrapper = toml::from_str("").unwrap();
        let registry = wrapper.chains.to_registry().unwrap();
        assert_eq!(registry.len(), ChainRegistry::builtin().unwrap().len());
    }

    #[test]
    fn resolves_environment_references() {
        assert_eq!(resolve_env("https://rpc").unwrap(), "https://rpc");
        assert_eq!(resolve_env("$").unwrap(), "$");
        assert!(matches!(
            resolve_env("${CHAINSWITCH_TEST_SURELY_UNSET_VAR}"),
            Err(Error::Config(_))
        ));
        let path = std::env::var("PATH").unwrap();
        assert_eq!(resolve_env("$PATH").unwrap(), path);
        assert_eq!(resolve_env("${PATH}").unwrap(), path);
    }

    #[test]
    fn serialises_back_to_caip2_keys() {
        let registry = ChainRegistry::builtin().unwrap();
        let wrapper = Wrapper {
            chains: ChainsConfig::from_registry(&registry),
        };
        let rendered = toml::to_string(&wrapper).unwrap();
        assert!(rendered.contains("[chains.\"eip155:137\"]"));
        let parsed: Wrapper = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.chains, wrapper.chains);
    }
}
