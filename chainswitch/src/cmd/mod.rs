//! CLI definitions and command implementations.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use chainswitch::config::{Config, load_config};
use chainswitch::error::Error;

pub mod chains;
pub mod init;
pub mod serve;
pub mod switch;

/// chainswitch: EVM chain registry, failover RPC and wallet network switching.
#[derive(Debug, Parser)]
#[command(name = "chainswitch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a TOML configuration file seeded with the built-in chains.
    Init {
        /// Output path for the configuration file.
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite the file if it already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// List the supported chains.
    Chains {
        /// Path to the TOML configuration file; the built-in table is used
        /// when omitted.
        #[arg(short, long, env = "CONFIG")]
        config: Option<PathBuf>,
    },

    /// Switch a wallet to a chain, adding the chain if the wallet lacks it.
    Switch {
        /// JSON-RPC endpoint of the wallet.
        #[arg(long, env = "WALLET_URL")]
        wallet_url: String,

        /// Path to the TOML configuration file; the built-in table is used
        /// when omitted.
        #[arg(short, long, env = "CONFIG")]
        config: Option<PathBuf>,

        /// Target chain: decimal id, hex id, `eip155:<id>` or exact name.
        chain: String,
    },

    /// Start the HTTP query service.
    Serve {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,
    },
}

/// Loads `.env`, then the config file if one is given.
fn load(config: Option<&Path>) -> Result<Config, Error> {
    dotenv().ok();
    config.map_or_else(|| Ok(Config::default()), load_config)
}
