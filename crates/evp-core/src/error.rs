//! # Error Hierarchy
//!
//! [`EvidenceError`] is the taxonomy every layer reports in. Each crate keeps
//! its own detailed `thiserror` enum and converts into this one at its
//! boundary, so callers of the orchestrators only ever match on:
//!
//! | Variant | Meaning | Caller action |
//! |---|---|---|
//! | `Decryption` | wrong passphrase or corrupted payload | fix the passphrase |
//! | `Encryption` | local KDF/RNG failure while encrypting | report, nothing was stored |
//! | `NotFound` | unknown evidence id or content id | fix the id |
//! | `StoreUnavailable` | content store transport/service failure | retry |
//! | `LedgerRejected` | authenticated commit refused | retry; content may already be stored |
//! | `LedgerUnavailable` | ledger unreachable, commit outcome unknown | check `count()`, then retry |
//! | `LedgerCorrupted` | stored ledger failed its integrity check | restore the ledger, do not retry |
//! | `Validation` | malformed input | fix the input |

use thiserror::Error;

/// Shared error taxonomy for the evidence protection stack.
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// Wrong passphrase, or the payload is corrupted or truncated.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Key derivation, randomness or cipher setup failed while encrypting.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The requested evidence record or content blob does not exist.
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// The content store could not be reached or failed transiently.
    #[error("content store unavailable: {0}")]
    StoreUnavailable(String),

    /// The ledger refused the append. No record was created.
    #[error("ledger rejected append: {0}")]
    LedgerRejected(String),

    /// The ledger could not be reached. For appends the outcome is unknown.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The ledger's own history failed verification. Retrying cannot help.
    #[error("ledger integrity check failed: {0}")]
    LedgerCorrupted(String),

    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl EvidenceError {
    /// Whether retrying the same call may succeed without user intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::LedgerRejected(_) | Self::LedgerUnavailable(_)
        )
    }
}

/// What could not be found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    /// Evidence id outside `[1, count]`.
    #[error("evidence #{id} does not exist (ledger holds {count} records)")]
    Evidence { id: u64, count: u64 },

    /// Content id unknown to the content store.
    #[error("content {0} is not in the store")]
    Content(String),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Non-integer numbers have no stable canonical form.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for identifier newtypes and encoded values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Evidence ids are 1-based.
    #[error("invalid evidence id: {0} (ids start at 1)")]
    InvalidEvidenceId(u64),

    /// Content id is empty, too long, or contains forbidden characters.
    #[error("invalid content id: \"{value}\" ({reason})")]
    InvalidContentId { value: String, reason: String },

    /// Submitter id does not match `ed25519:<64 hex chars>`.
    #[error("invalid submitter id: \"{0}\" (expected ed25519:<64 hex chars>)")]
    InvalidSubmitterId(String),

    /// Timestamp out of the representable range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// Digest string is not `sha256:<64 hex chars>`.
    #[error("invalid digest: \"{0}\"")]
    InvalidDigest(String),

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Passphrase must be non-empty.
    #[error("passphrase must not be empty")]
    EmptyPassphrase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_evidence_display_includes_bounds() {
        let err = EvidenceError::from(NotFoundError::Evidence { id: 7, count: 3 });
        let msg = format!("{err}");
        assert!(msg.contains("#7"));
        assert!(msg.contains("3 records"));
    }

    #[test]
    fn not_found_content_display() {
        let err = EvidenceError::from(NotFoundError::Content("QmXyz".into()));
        assert!(format!("{err}").contains("QmXyz"));
    }

    #[test]
    fn retryable_classification() {
        assert!(EvidenceError::StoreUnavailable("down".into()).is_retryable());
        assert!(EvidenceError::LedgerRejected("declined".into()).is_retryable());
        assert!(EvidenceError::LedgerUnavailable("timeout".into()).is_retryable());
        assert!(!EvidenceError::Decryption("bad tag".into()).is_retryable());
        assert!(!EvidenceError::Encryption("rng".into()).is_retryable());
        assert!(!EvidenceError::LedgerCorrupted("line 3".into()).is_retryable());
        assert!(!EvidenceError::from(NotFoundError::Content("x".into())).is_retryable());
        assert!(!EvidenceError::from(ValidationError::EmptyPassphrase).is_retryable());
    }

    #[test]
    fn validation_error_messages() {
        assert!(format!("{}", ValidationError::InvalidEvidenceId(0)).contains("start at 1"));
        let err = ValidationError::InvalidContentId {
            value: "a b".into(),
            reason: "whitespace".into(),
        };
        assert!(format!("{err}").contains("whitespace"));
    }

    #[test]
    fn canonicalization_float_message() {
        let err = CanonicalizationError::FloatRejected(2.5);
        assert!(format!("{err}").contains("2.5"));
    }
}
