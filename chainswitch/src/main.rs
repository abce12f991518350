//! chainswitch
//!
//! CLI front end for the chain registry, failover RPC clients and wallet
//! network negotiation.
//!
//! ```sh
//! chainswitch init                                  # Generate config.toml
//! chainswitch chains                                # List supported chains
//! chainswitch switch --wallet-url http://... 137    # Switch a wallet
//! chainswitch serve                                 # Start the query service
//! ```

mod cmd;

use clap::Parser;
use cmd::{Cli, Commands};

/// Exit status when the wallet ends on a chain other than the requested one.
const EXIT_NOT_SWITCHED: i32 = 2;

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve { .. }) {
        chainswitch::init_console_logging("warn");
    }

    let result = match cli.command {
        Commands::Init { output, force } => cmd::init::run(&output, force),
        Commands::Chains { config } => cmd::chains::run(config.as_deref()),
        Commands::Switch {
            wallet_url,
            config,
            chain,
        } => match cmd::switch::run(config.as_deref(), &wallet_url, &chain).await {
            Ok(outcome) if !outcome.is_success() => std::process::exit(EXIT_NOT_SWITCHED),
            other => other.map(drop),
        },
        Commands::Serve { config } => cmd::serve::run(&config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
