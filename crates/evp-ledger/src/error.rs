//! Ledger error types.

use evp_core::{CanonicalizationError, EvidenceError, NotFoundError, ValidationError};
use thiserror::Error;

/// Errors from ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// `id` is outside `[1, count]`.
    #[error("evidence #{id} does not exist (ledger holds {count} records)")]
    NotFound { id: u64, count: u64 },

    /// The authorization signature does not verify.
    #[error("authorization rejected: {0}")]
    Unauthorized(String),

    /// The authorization was issued for a different ledger instance.
    #[error("authorization is for ledger {actual}, this is {expected}")]
    WrongLedger { expected: String, actual: String },

    /// The authorization nonce has already been used on this ledger.
    #[error("authorization nonce {0} was already used")]
    NonceReused(String),

    /// The submitter declined to authorize the append.
    #[error("submitter declined to authorize: {0}")]
    AuthorizationDeclined(String),

    /// The commit was refused by the ledger backend.
    #[error("commit reverted: {0}")]
    Reverted(String),

    /// The ledger could not be reached. For appends the outcome is unknown.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The journal does not replay to a valid hash chain.
    #[error("journal tampered at line {line}: {reason}")]
    Tampered { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LedgerError {
    /// Whether repeating a read may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

impl From<LedgerError> for EvidenceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { id, count } => {
                EvidenceError::NotFound(NotFoundError::Evidence { id, count })
            }
            LedgerError::Validation(v) => EvidenceError::Validation(v),
            LedgerError::Unavailable(_) | LedgerError::Io(_) => {
                EvidenceError::LedgerUnavailable(err.to_string())
            }
            LedgerError::Tampered { .. } => EvidenceError::LedgerCorrupted(err.to_string()),
            LedgerError::Unauthorized(_)
            | LedgerError::WrongLedger { .. }
            | LedgerError::NonceReused(_)
            | LedgerError::AuthorizationDeclined(_)
            | LedgerError::Reverted(_)
            | LedgerError::Serialization(_)
            | LedgerError::Canonicalization(_) => EvidenceError::LedgerRejected(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_bounds() {
        let err: EvidenceError = LedgerError::NotFound { id: 2, count: 1 }.into();
        assert!(matches!(
            err,
            EvidenceError::NotFound(NotFoundError::Evidence { id: 2, count: 1 })
        ));
    }

    #[test]
    fn declined_maps_to_rejected() {
        let err: EvidenceError = LedgerError::AuthorizationDeclined("user cancelled".into()).into();
        match err {
            EvidenceError::LedgerRejected(msg) => assert!(msg.contains("user cancelled")),
            other => panic!("expected LedgerRejected, got {other:?}"),
        }
    }

    #[test]
    fn unavailable_is_transient_and_maps_to_unavailable() {
        let err = LedgerError::Unavailable("timeout".into());
        assert!(err.is_transient());
        assert!(matches!(
            EvidenceError::from(err),
            EvidenceError::LedgerUnavailable(_)
        ));
    }

    #[test]
    fn tampering_is_not_transient() {
        let err = LedgerError::Tampered {
            line: 3,
            reason: "digest mismatch".into(),
        };
        assert!(!err.is_transient());
        assert!(format!("{err}").contains("line 3"));

        let mapped = EvidenceError::from(err);
        assert!(matches!(mapped, EvidenceError::LedgerCorrupted(_)));
        assert!(!mapped.is_retryable());
    }
}
