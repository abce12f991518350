//! Configuration loading and default template generation.
//!
//! This module provides:
//!
//! - [`Config`] — server address, RPC and wallet options, and the
//!   [`ChainsConfig`] chain table.
//! - [`load_config`] — Reads and parses a TOML configuration file.
//! - [`generate_default_config`] — Produces a commented TOML template seeded
//!   with the built-in chain table.
//!
//! # Configuration File Format
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//!
//! [rpc]
//! timeout_secs = 10
//!
//! [wallet]
//! timeout_secs = 120
//!
//! [chains."eip155:137"]
//! name = "Polygon"
//! currency = "MATIC"
//! rpc = ["https://rpc.ankr.com/polygon", "$POLYGON_RPC_URL"]
//! explorer = "https://polygonscan.com"
//! ```

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chain::{ChainRegistry, ChainsConfig};
use crate::error::Error;
use crate::networks::Networks;
use crate::rpc::{DEFAULT_RPC_TIMEOUT, RpcOptions};

const DEFAULT_PORT: u16 = 8080;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_host")]
    host: IpAddr,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    rpc: RpcConfig,
    #[serde(default)]
    wallet: WalletConfig,
    #[serde(default)]
    chains: ChainsConfig,
}

/// `[rpc]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcConfig {
    /// Per-endpoint request timeout in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_rpc_timeout_secs(),
        }
    }
}

/// `[wallet]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletConfig {
    /// Negotiation timeout in seconds; unset means wait for the wallet
    /// indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_host() -> IpAddr {
    env::var("HOST")
        .ok()
        .and_then(|h| h.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

const fn default_rpc_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rpc: RpcConfig::default(),
            wallet: WalletConfig::default(),
            chains: ChainsConfig::default(),
        }
    }
}

impl Config {
    /// Bind address.
    #[must_use]
    pub const fn host(&self) -> IpAddr {
        self.host
    }

    /// Bind port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Configured chain table; empty means the built-in table.
    #[must_use]
    pub const fn chains(&self) -> &ChainsConfig {
        &self.chains
    }

    /// Options for read clients.
    #[must_use]
    pub const fn rpc_options(&self) -> RpcOptions {
        RpcOptions {
            timeout: Duration::from_secs(self.rpc.timeout_secs),
        }
    }

    /// Wallet negotiation timeout, if any.
    #[must_use]
    pub fn wallet_timeout(&self) -> Option<Duration> {
        self.wallet.timeout_secs.map(Duration::from_secs)
    }

    /// Validated chain registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on unresolved environment references or an
    /// invalid chain table.
    pub fn registry(&self) -> Result<ChainRegistry, Error> {
        self.chains.to_registry()
    }

    /// Registry, read clients and negotiator built from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the registry is invalid or the HTTP client
    /// cannot be built.
    pub fn networks(&self) -> Result<Networks, Error> {
        let networks = Networks::new(self.registry()?, &self.rpc_options())?;
        Ok(match self.wallet_timeout() {
            Some(timeout) => networks.with_wallet_timeout(timeout),
            None => networks,
        })
    }
}

/// Load configuration from a TOML file at the given path.
///
/// Values not present in the file fall back to environment variables
/// (`PORT`, `HOST`) and then to hardcoded defaults.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be resolved, read, or parsed.
pub fn load_config(path: &Path) -> Result<Config, Error> {
    let config_path = path.canonicalize().map_err(|e| {
        Error::config_with(
            format!("failed to resolve config path '{}'", path.display()),
            e,
        )
    })?;
    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::config_with(
            format!("failed to read config file '{}'", config_path.display()),
            e,
        )
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| {
        Error::config_with(
            format!("failed to parse TOML config '{}'", config_path.display()),
            e,
        )
    })?;
    tracing::debug!(path = %config_path.display(), chains = config.chains.len(), "config loaded");
    Ok(config)
}

/// Generate a default TOML configuration template.
///
/// The chain section lists every built-in chain so it can be edited in place.
///
/// # Errors
///
/// Returns [`Error::Config`] if the built-in table cannot be rendered.
pub fn generate_default_config() -> Result<String, Error> {
    #[derive(Serialize)]
    struct ChainsSection {
        chains: ChainsConfig,
    }

    let mut config = String::from(
        r#"# chainswitch configuration

# Server bind address and port.
# Can also be set via HOST / PORT environment variables.
host = "0.0.0.0"
port = 8080

[rpc]
# Per-endpoint timeout before failing over to the next RPC URL.
timeout_secs = 10

[wallet]
# Give up on a switch/add exchange after this many seconds.
# timeout_secs = 120

# ── EIP-155 chains ──────────────────────────────────────────────────
# Key format: "eip155:<chain_id>"
# `rpc` lists endpoints in failover order; the second one (or the first,
# if only one is given) is offered to wallets when adding the chain.
# Entries support environment variable references: "$VAR" or "${VAR}".
# Remove every chain to fall back to the built-in table.

"#,
    );

    let section = ChainsSection {
        chains: ChainsConfig::from_registry(&ChainRegistry::builtin()?),
    };
    let chains = toml::to_string(&section)
        .map_err(|e| Error::config_with("failed to render built-in chain table", e))?;
    config.push_str(&chains);
    Ok(config)
}
