//! Orchestrator errors. Each one names the step that failed and carries the
//! shared [`EvidenceError`] classification.

use evp_core::{ContentId, EvidenceError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStep {
    Encrypt,
    Store,
    Register,
}

impl std::fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Encrypt => "encrypt",
            Self::Store => "store",
            Self::Register => "register",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStep {
    Lookup,
    Fetch,
    Decrypt,
}

impl std::fmt::Display for RetrievalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Lookup => "ledger lookup",
            Self::Fetch => "content fetch",
            Self::Decrypt => "decrypt",
        })
    }
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    /// `orphaned` is set when the blob was stored but never registered.
    #[error("submission failed at {step} step: {source}")]
    Submission {
        step: SubmissionStep,
        orphaned: Option<ContentId>,
        #[source]
        source: EvidenceError,
    },

    #[error("retrieval of evidence #{evidence_id} failed at {step} step: {source}")]
    Retrieval {
        evidence_id: u64,
        step: RetrievalStep,
        #[source]
        source: EvidenceError,
    },

    #[error("listing evidence failed: {0}")]
    Listing(#[source] EvidenceError),
}

impl ProtocolError {
    pub(crate) fn submission(step: SubmissionStep, source: impl Into<EvidenceError>) -> Self {
        Self::Submission {
            step,
            orphaned: None,
            source: source.into(),
        }
    }

    pub(crate) fn registration(content_id: ContentId, source: impl Into<EvidenceError>) -> Self {
        Self::Submission {
            step: SubmissionStep::Register,
            orphaned: Some(content_id),
            source: source.into(),
        }
    }

    pub(crate) fn retrieval(
        evidence_id: u64,
        step: RetrievalStep,
        source: impl Into<EvidenceError>,
    ) -> Self {
        Self::Retrieval {
            evidence_id,
            step,
            source: source.into(),
        }
    }

    /// The shared classification of the underlying failure.
    pub fn kind(&self) -> &EvidenceError {
        match self {
            Self::Submission { source, .. } | Self::Retrieval { source, .. } => source,
            Self::Listing(source) => source,
        }
    }

    /// Content stored by a submission whose registration failed.
    pub fn orphaned_content(&self) -> Option<&ContentId> {
        match self {
            Self::Submission { orphaned, .. } => orphaned.as_ref(),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evp_core::NotFoundError;

    #[test]
    fn registration_error_exposes_orphan() {
        let cid = ContentId::new("QmOrphan").unwrap();
        let err = ProtocolError::registration(
            cid.clone(),
            EvidenceError::LedgerRejected("declined".into()),
        );
        assert_eq!(err.orphaned_content(), Some(&cid));
        assert!(err.is_retryable());
        assert!(format!("{err}").contains("register step"));
    }

    #[test]
    fn retrieval_error_names_step() {
        let err = ProtocolError::retrieval(
            2,
            RetrievalStep::Lookup,
            EvidenceError::from(NotFoundError::Evidence { id: 2, count: 1 }),
        );
        let msg = format!("{err}");
        assert!(msg.contains("#2"));
        assert!(msg.contains("ledger lookup"));
        assert!(matches!(err.kind(), EvidenceError::NotFound(_)));
        assert!(err.orphaned_content().is_none());
    }
}
