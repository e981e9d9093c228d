//! # evp-ledger: Append-Only Evidence Ledger
//!
//! The ledger is the single source of truth for which evidence exists. It
//! assigns dense 1-based ids, stamps `submitted_at` from its own clock, and
//! derives `submitter` from a verified [`AppendAuthorization`]. Clients
//! never supply provenance.
//!
//! ## Record Lifecycle
//!
//! absent → present. There is no update and no delete. A rejected append
//! leaves no trace.
//!
//! ## Backends
//!
//! - [`MemoryLedger`]: records under a `parking_lot::Mutex`, with fault
//!   injection for tests.
//! - [`JournalLedger`]: JSON-lines journal, SHA-256 hash chain, `fsync`
//!   before an id is returned, chain verified on open.

pub mod authorization;
pub mod clock;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod memory;

pub use authorization::{
    AppendAuthorization, AppendNonce, Authorizer, Ed25519Authorizer, APPEND_DOMAIN,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::LedgerError;
pub use journal::{JournalLedger, JournalSummary};
pub use ledger::{EvidenceLedger, LedgerIter};
pub use memory::MemoryLedger;

/// Fresh random ledger instance id, e.g. `evp-ledger-3f9a…`.
pub(crate) fn generate_ledger_id(prefix: &str) -> Result<String, LedgerError> {
    use rand::RngCore;
    let mut raw = [0u8; 16];
    rand::rngs::OsRng
        .try_fill_bytes(&mut raw)
        .map_err(|e| LedgerError::Unavailable(format!("random ledger id: {e}")))?;
    Ok(format!("{prefix}-{}", evp_core::hex::encode(&raw)))
}
