//! Chain registry, endpoint selection and chain table configuration.
//!
//! - `record` — [`ChainId`], [`ChainSelector`] and [`ChainRecord`].
//! - `registry` — the validated, immutable [`ChainRegistry`].
//! - `endpoints` — primary / registration endpoint policy.
//! - [`builtin`] — the default chain table.
//! - `config` — CAIP-2 keyed TOML (de)serialisation of chain tables.

pub mod builtin;
mod config;
mod endpoints;
mod record;
mod registry;

pub use self::config::*;
pub use self::endpoints::{REDACTED_ENDPOINT, redact_endpoint};
pub use self::record::*;
pub use self::registry::*;
