//! # evp-core: Foundational Types for the Evidence Protection Stack
//!
//! Every other crate in the workspace depends on `evp-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `EvidenceId`, `ContentId` and
//!    `SubmitterId` have validated constructors. An evidence id of zero or an
//!    empty content id cannot be represented.
//!
//! 2. **Ledger-stamped provenance.** [`EvidenceRecord`] is only ever built by
//!    a ledger implementation. Clients never supply `submitted_at` or
//!    `submitter`.
//!
//! 3. **`CanonicalBytes` for everything that is signed or chained.** Append
//!    authorizations and journal entries are canonicalized (RFC 8785) before
//!    hashing or signing.
//!
//! 4. **One error taxonomy.** [`EvidenceError`] is the vocabulary shared by
//!    the codec, the store, the ledger and the orchestrators.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `evp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod hex;
pub mod identity;
pub mod record;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_raw, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, EvidenceError, NotFoundError, ValidationError};
pub use identity::{ContentId, EvidenceId, SubmitterId};
pub use record::EvidenceRecord;
pub use temporal::Timestamp;
