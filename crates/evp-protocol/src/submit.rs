//! Submission: encrypt, store, register.

use evp_core::{ContentId, EvidenceError, EvidenceId, SubmitterId};
use evp_crypto::{CryptoError, Passphrase};
use evp_ledger::{Authorizer, EvidenceLedger, LedgerError};
use evp_store::{ContentMetadata, ContentStore};

use crate::error::{ProtocolError, SubmissionStep};
use crate::retry::bounded;
use crate::service::EvidenceService;

/// A document to protect.
#[derive(Clone)]
pub struct SubmissionRequest {
    document: Vec<u8>,
    file_name: Option<String>,
}

impl SubmissionRequest {
    pub fn new(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: document.into(),
            file_name: None,
        }
    }

    /// Original file name, recorded in store metadata as `{name}.encrypted`.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    fn metadata(&self) -> ContentMetadata {
        match &self.file_name {
            Some(name) => ContentMetadata::for_encrypted_file(name),
            None => ContentMetadata::anonymous(),
        }
    }
}

impl std::fmt::Debug for SubmissionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionRequest")
            .field("document_len", &self.document.len())
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub evidence_id: EvidenceId,
    pub content_id: ContentId,
    pub submitter: SubmitterId,
}

impl<S, L, A> EvidenceService<S, L, A>
where
    S: ContentStore,
    L: EvidenceLedger,
    A: Authorizer,
{
    /// Encrypt `request` under `passphrase`, store the ciphertext and append
    /// a ledger record pointing at it.
    ///
    /// On a registration failure the stored content id is available via
    /// [`ProtocolError::orphaned_content`].
    pub async fn submit(
        &self,
        request: SubmissionRequest,
        passphrase: &Passphrase,
    ) -> Result<SubmissionReceipt, ProtocolError> {
        let metadata = request.metadata();
        let size = request.len();
        let codec = self.codec;
        let secret = passphrase.clone();
        let document = request.document;

        let payload = tokio::task::spawn_blocking(move || codec.encrypt(&document, &secret))
            .await
            .map_err(|e| {
                ProtocolError::submission(
                    SubmissionStep::Encrypt,
                    EvidenceError::Encryption(format!("encryption task failed: {e}")),
                )
            })?
            .map_err(|e: CryptoError| ProtocolError::submission(SubmissionStep::Encrypt, e))?;

        let armored = payload.to_armored();
        let content_id = self
            .put_blob(armored.as_bytes(), &metadata)
            .await
            .map_err(|e| ProtocolError::submission(SubmissionStep::Store, e))?;

        tracing::info!(
            content_id = %content_id,
            backend = self.store.backend(),
            document_bytes = size,
            stored_bytes = armored.len(),
            "encrypted evidence stored"
        );

        self.resume_registration(content_id).await
    }

    /// Append a ledger record for content that is already stored.
    ///
    /// Used by [`submit`](Self::submit) and to finish a submission whose
    /// registration step failed. Appends are never retried here: after a
    /// timeout the outcome is unknown and the caller should check
    /// `count()` before calling again.
    pub async fn resume_registration(
        &self,
        content_id: ContentId,
    ) -> Result<SubmissionReceipt, ProtocolError> {
        let authorization = match self.authorizer.authorize(self.ledger.ledger_id(), &content_id) {
            Ok(auth) => auth,
            Err(e) => return Err(self.orphaned(content_id, e)),
        };

        let appended = bounded(self.config.ledger_timeout, self.ledger.append(&authorization), || {
            self.ledger_timeout("append")
        })
        .await;

        match appended {
            Ok(evidence_id) => {
                let submitter = authorization.public_key.submitter_id();
                tracing::info!(
                    evidence_id = %evidence_id,
                    content_id = %content_id,
                    submitter = %submitter,
                    "evidence registered"
                );
                Ok(SubmissionReceipt {
                    evidence_id,
                    content_id,
                    submitter,
                })
            }
            Err(e) => Err(self.orphaned(content_id, e)),
        }
    }

    fn orphaned(&self, content_id: ContentId, err: LedgerError) -> ProtocolError {
        tracing::warn!(
            content_id = %content_id,
            ledger = self.ledger.ledger_id(),
            error = %err,
            "content stored but not registered"
        );
        ProtocolError::registration(content_id, err)
    }
}
