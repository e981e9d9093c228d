//! # evp-cli: Evidence Protection Command-Line Interface
//!
//! ## Subcommands
//!
//! - `keygen`: generate the Ed25519 key that authorizes ledger appends
//! - `submit`: encrypt a document, store it and register it on the ledger
//! - `resume`: register content left behind by a failed submission
//! - `retrieve`: fetch and decrypt evidence by id
//! - `list`: print every ledger record
//! - `verify-journal`: audit a ledger journal's hash chain offline
//!
//! Handlers take parsed arguments plus the loaded [`CliConfig`] and return
//! a process exit code. Passphrases are read from an environment variable,
//! never from the command line.

pub mod backend;
pub mod config;
pub mod evidence;
pub mod journal;
pub mod keygen;

pub use config::CliConfig;
