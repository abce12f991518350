//! Default chain table compiled into the crate.
//!
//! Used when the configuration file has no `[chains]` section, and written out
//! by `chainswitch init` as the starting point for a custom table.

use super::record::ChainRecord;

/// Static form of a [`ChainRecord`].
#[derive(Debug, Clone, Copy)]
pub struct BuiltinChain {
    /// Numeric chain id.
    pub chain_id: u64,
    /// Display name.
    pub name: &'static str,
    /// Native currency symbol.
    pub currency: &'static str,
    /// RPC endpoints; the second one, when present, is offered to wallets.
    pub rpc: &'static [&'static str],
    /// Block explorer base URL.
    pub explorer: Option<&'static str>,
}

impl BuiltinChain {
    /// Owned record for registry construction.
    #[must_use]
    pub fn to_record(&self) -> ChainRecord {
        let record = ChainRecord::new(
            self.chain_id,
            self.name,
            self.currency,
            self.rpc.iter().copied(),
        );
        match self.explorer {
            Some(explorer) => record.with_explorer(explorer),
            None => record,
        }
    }
}

/// All chains supported out of the box.
pub static BUILTIN_CHAINS: &[BuiltinChain] = &[
    BuiltinChain {
        chain_id: 1,
        name: "Ethereum",
        currency: "ETH",
        rpc: &["https://rpc.ankr.com/eth"],
        explorer: Some("https://etherscan.io"),
    },
    BuiltinChain {
        chain_id: 10,
        name: "Optimism",
        currency: "ETH",
        rpc: &["https://rpc.ankr.com/optimism"],
        explorer: Some("https://optimistic.etherscan.io"),
    },
    BuiltinChain {
        chain_id: 14,
        name: "Flare",
        currency: "FLR",
        rpc: &["https://flare-api.flare.network/ext/C/rpc"],
        explorer: Some("https://flare-explorer.flare.network"),
    },
    BuiltinChain {
        chain_id: 16,
        name: "Coston Testnet",
        currency: "FLR",
        rpc: &["https://coston-api.flare.network/ext/C/rpc"],
        explorer: Some("https://coston-explorer.flare.network"),
    },
    BuiltinChain {
        chain_id: 19,
        name: "Songbird",
        currency: "SGB",
        rpc: &["https://sgb.ftso.com.au/ext/bc/C/rpc"],
        explorer: Some("https://songbird-explorer.flare.network"),
    },
    BuiltinChain {
        chain_id: 56,
        name: "BNB Smart Chain",
        currency: "BNB",
        rpc: &["https://rpc.ankr.com/bsc"],
        explorer: Some("https://bscscan.com"),
    },
    BuiltinChain {
        chain_id: 69,
        name: "Optimism Testnet",
        currency: "ETH",
        rpc: &["https://kovan.optimism.io"],
        explorer: Some("https://kovan-optimistic.etherscan.io"),
    },
    BuiltinChain {
        chain_id: 77,
        name: "Gnosis Testnet",
        currency: "SPOA",
        rpc: &["https://sokol.poa.network"],
        explorer: Some("https://blockscout.com/poa/sokol"),
    },
    BuiltinChain {
        chain_id: 100,
        name: "Gnosis Chain",
        currency: "XDAI",
        rpc: &["https://rpc.ankr.com/gnosis", "https://rpc.gnosis.gateway.fm"],
        explorer: Some("https://gnosisscan.io"),
    },
    BuiltinChain {
        chain_id: 137,
        name: "Polygon",
        currency: "MATIC",
        rpc: &["https://rpc.ankr.com/polygon"],
        explorer: Some("https://polygonscan.com"),
    },
    BuiltinChain {
        chain_id: 250,
        name: "Fantom",
        currency: "FTM",
        rpc: &["https://rpc.ankr.com/fantom"],
        explorer: Some("https://ftmscan.com"),
    },
    BuiltinChain {
        chain_id: 255,
        name: "Kroma",
        currency: "ETH",
        rpc: &["https://api.kroma.network/"],
        explorer: Some("https://kromascan.com"),
    },
    BuiltinChain {
        chain_id: 324,
        name: "zkSync Era",
        currency: "ETH",
        rpc: &["https://mainnet.era.zksync.io"],
        explorer: Some("https://explorer.zksync.io"),
    },
    BuiltinChain {
        chain_id: 3110,
        name: "SatoshiVM Testnet",
        currency: "BTC",
        rpc: &["https://testnet.svmscan.io/"],
        explorer: Some("https://testnet.svmscan.io"),
    },
    BuiltinChain {
        chain_id: 4002,
        name: "Fantom Testnet",
        currency: "FTM",
        rpc: &[
            "https://rpc.ankr.com/fantom_testnet",
            "https://fantom-testnet.public.blastapi.io",
        ],
        explorer: Some("https://testnet.ftmscan.com"),
    },
    BuiltinChain {
        chain_id: 42161,
        name: "Arbitrum",
        currency: "ETH",
        rpc: &["https://rpc.ankr.com/arbitrum"],
        explorer: Some("https://arbiscan.io"),
    },
    BuiltinChain {
        chain_id: 42170,
        name: "Arbitrum Nova",
        currency: "ETH",
        rpc: &["https://nova.arbitrum.io/rpc"],
        explorer: Some("https://nova.arbiscan.io"),
    },
    BuiltinChain {
        chain_id: 42766,
        name: "ZKFair",
        currency: "USDC",
        rpc: &["https://rpc.zkfair.io"],
        explorer: Some("https://scan.zkfair.io"),
    },
    BuiltinChain {
        chain_id: 59144,
        name: "Linea",
        currency: "ETH",
        rpc: &["https://rpc.linea.build/"],
        explorer: Some("https://lineascan.build"),
    },
    BuiltinChain {
        chain_id: 80001,
        name: "Polygon Testnet",
        currency: "MATIC",
        rpc: &["https://matic-mumbai.chainstacklabs.com"],
        explorer: Some("https://mumbai.polygonscan.com"),
    },
    BuiltinChain {
        chain_id: 167_007,
        name: "Taiko Jolnir Testnet",
        currency: "ETH",
        rpc: &["https://rpc.jolnir.taiko.xyz"],
        explorer: Some("https://explorer.jolnir.taiko.xyz"),
    },
    BuiltinChain {
        chain_id: 167_008,
        name: "Taiko Katla Testnet",
        currency: "ETH",
        rpc: &["https://rpc.katla.taiko.xyz"],
        explorer: Some("https://explorer.katla.taiko.xyz"),
    },
    BuiltinChain {
        chain_id: 421_611,
        name: "Arbitrum Testnet",
        currency: "ETH",
        rpc: &["https://rinkeby.arbitrum.io/rpc"],
        explorer: Some("https://testnet.arbiscan.io"),
    },
    BuiltinChain {
        chain_id: 421_613,
        name: "Arbitrum Goerli Testnet",
        currency: "ETH",
        rpc: &["https://goerli-rollup.arbitrum.io/rpc"],
        explorer: None,
    },
    BuiltinChain {
        chain_id: 534_352,
        name: "Scroll",
        currency: "ETH",
        rpc: &["https://rpc.scroll.io/"],
        explorer: Some("https://scrollscan.com"),
    },
    BuiltinChain {
        chain_id: 1_313_161_555,
        name: "Aurora Testnet",
        currency: "ETH",
        rpc: &["https://testnet.aurora.dev"],
        explorer: Some("https://testnet.aurorascan.dev"),
    },
];
