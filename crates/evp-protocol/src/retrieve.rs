//! Retrieval: look up, fetch, decrypt.

use evp_core::{EvidenceError, EvidenceRecord};
use evp_crypto::{CryptoError, EncryptedPayload, Passphrase};
use evp_ledger::{Authorizer, EvidenceLedger};
use evp_store::ContentStore;
use zeroize::Zeroizing;

use crate::error::{ProtocolError, RetrievalStep};
use crate::service::EvidenceService;

/// Decrypted evidence together with the ledger record it came from.
pub struct VerifiedEvidence {
    pub plaintext: Zeroizing<Vec<u8>>,
    pub record: EvidenceRecord,
}

impl VerifiedEvidence {
    pub fn suggested_file_name(&self) -> String {
        self.record.suggested_file_name()
    }
}

impl std::fmt::Debug for VerifiedEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedEvidence")
            .field("plaintext", &format_args!("[{} bytes]", self.plaintext.len()))
            .field("record", &self.record)
            .finish()
    }
}

impl<S, L, A> EvidenceService<S, L, A>
where
    S: ContentStore,
    L: EvidenceLedger,
    A: Authorizer,
{
    /// Fetch and decrypt evidence `id`.
    ///
    /// Ids outside `1..=count` fail at the lookup step with `NotFound`. A
    /// wrong passphrase and a corrupted blob both fail at the decrypt step.
    pub async fn retrieve(
        &self,
        id: u64,
        passphrase: &Passphrase,
    ) -> Result<VerifiedEvidence, ProtocolError> {
        let record = self
            .read_record(id)
            .await
            .map_err(|e| ProtocolError::retrieval(id, RetrievalStep::Lookup, e))?;

        let blob = self
            .fetch_blob(&record.content_id)
            .await
            .map_err(|e| ProtocolError::retrieval(id, RetrievalStep::Fetch, e))?;

        let secret = passphrase.clone();
        let plaintext = tokio::task::spawn_blocking(move || {
            let payload = EncryptedPayload::from_bytes(&blob)?;
            evp_crypto::decrypt(&payload, &secret)
        })
        .await
        .map_err(|e| {
            ProtocolError::retrieval(
                id,
                RetrievalStep::Decrypt,
                EvidenceError::Decryption(format!("decryption task failed: {e}")),
            )
        })?
        .map_err(|e: CryptoError| ProtocolError::retrieval(id, RetrievalStep::Decrypt, e))?;

        tracing::info!(
            evidence_id = %record.id,
            content_id = %record.content_id,
            bytes = plaintext.len(),
            "evidence retrieved"
        );

        Ok(VerifiedEvidence {
            plaintext: Zeroizing::new(plaintext),
            record,
        })
    }
}
