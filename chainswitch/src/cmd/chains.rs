//! `chainswitch chains` command.

use std::path::Path;

use chainswitch::chain::redact_endpoint;
use chainswitch::error::Error;

/// Prints one line per registry chain.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
#[allow(clippy::print_stdout)]
pub fn run(config: Option<&Path>) -> Result<(), Error> {
    let registry = super::load(config)?.registry()?;

    println!(
        "{:>12}  {:>12}  {:<32}  {:<8}  PRIMARY RPC",
        "ID", "HEX", "NAME", "CURRENCY"
    );
    for record in &registry {
        println!(
            "{:>12}  {:>12}  {:<32}  {:<8}  {}",
            record.chain_id.get(),
            record.chain_id.to_hex(),
            record.name,
            record.native_currency_symbol,
            record
                .primary_endpoint()
                .map_or_else(String::new, redact_endpoint),
        );
    }
    Ok(())
}
