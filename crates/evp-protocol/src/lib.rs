//! # evp-protocol: Evidence Submission and Retrieval
//!
//! [`EvidenceService`] composes a payload codec, a [`ContentStore`], an
//! [`EvidenceLedger`] and an [`Authorizer`]:
//!
//! ```text
//! submit:   encrypt ──► Store.put ──► Ledger.append ──► EvidenceId
//! retrieve: Ledger.get ──► Store.get ──► decrypt ──► plaintext + record
//! ```
//!
//! Ordering on submission is fixed: content exists in the store before the
//! ledger references it. A failure after the store step leaves an orphaned
//! blob, which is harmless; the error carries its content id so the caller
//! can [`resume_registration`](EvidenceService::resume_registration).
//!
//! Every store and ledger call runs under a timeout. Transient read and
//! store failures are retried with exponential backoff. Ledger appends are
//! never retried automatically.
//!
//! [`ContentStore`]: evp_store::ContentStore
//! [`EvidenceLedger`]: evp_ledger::EvidenceLedger
//! [`Authorizer`]: evp_ledger::Authorizer

pub mod config;
pub mod error;
pub mod retrieve;
pub(crate) mod retry;
pub mod service;
pub mod submit;

pub use config::{ProtocolConfig, RetryPolicy};
pub use error::{ProtocolError, RetrievalStep, SubmissionStep};
pub use retrieve::VerifiedEvidence;
pub use service::EvidenceService;
pub use submit::{SubmissionReceipt, SubmissionRequest};
