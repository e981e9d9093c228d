//! The [`EvidenceService`] and its shared plumbing.

use evp_core::{EvidenceError, EvidenceRecord};
use evp_crypto::CipherCodec;
use evp_ledger::{Authorizer, EvidenceLedger, LedgerError};
use evp_store::{ContentStore, StoreError};

use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use crate::retry::{bounded, retrying};

/// Listing reserves at most this many records before reading them.
const PREALLOCATE_LIMIT: u64 = 1024;

/// Submission and retrieval over one store, one ledger and one submitter.
pub struct EvidenceService<S, L, A> {
    pub(crate) store: S,
    pub(crate) ledger: L,
    pub(crate) authorizer: A,
    pub(crate) codec: CipherCodec,
    pub(crate) config: ProtocolConfig,
}

impl<S, L, A> std::fmt::Debug for EvidenceService<S, L, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceService")
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S, L, A> EvidenceService<S, L, A>
where
    S: ContentStore,
    L: EvidenceLedger,
    A: Authorizer,
{
    /// A service using the default codec cost.
    pub fn new(store: S, ledger: L, authorizer: A, config: ProtocolConfig) -> Self {
        Self {
            store,
            ledger,
            authorizer,
            codec: CipherCodec::default(),
            config,
        }
    }

    /// Replace the codec used for new submissions.
    pub fn with_codec(mut self, codec: CipherCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Every record on the ledger, in id order. A failing read aborts the
    /// listing; nothing is skipped.
    pub async fn list(&self) -> Result<Vec<EvidenceRecord>, ProtocolError> {
        let mut iter = bounded(self.config.ledger_timeout, self.ledger.iterate(), || {
            self.ledger_timeout("count")
        })
        .await
        .map_err(|e| ProtocolError::Listing(e.into()))?;

        let mut records = Vec::with_capacity(iter.remaining().min(PREALLOCATE_LIMIT) as usize);
        loop {
            let next = tokio::time::timeout(self.config.ledger_timeout, iter.next()).await;
            match next {
                Ok(Some(Ok(record))) => records.push(record),
                Ok(Some(Err(e))) => return Err(ProtocolError::Listing(e.into())),
                Ok(None) => break,
                Err(_) => {
                    return Err(ProtocolError::Listing(EvidenceError::from(
                        self.ledger_timeout("get"),
                    )))
                }
            }
        }
        Ok(records)
    }

    /// Ledger read with timeout and retry.
    pub(crate) async fn read_record(&self, id: u64) -> Result<EvidenceRecord, LedgerError> {
        retrying(&self.config.retry, "ledger.get", LedgerError::is_transient, || {
            bounded(self.config.ledger_timeout, self.ledger.get(id), || {
                self.ledger_timeout("get")
            })
        })
        .await
    }

    /// Store write with timeout and retry. Puts are content-addressed, so
    /// repeating one is idempotent.
    pub(crate) async fn put_blob(
        &self,
        blob: &[u8],
        metadata: &evp_store::ContentMetadata,
    ) -> Result<evp_core::ContentId, StoreError> {
        retrying(&self.config.retry, "store.put", StoreError::is_transient, || {
            bounded(self.config.store_timeout, self.store.put(blob, metadata), || {
                self.store_timeout("put")
            })
        })
        .await
    }

    /// Store read with timeout and retry.
    pub(crate) async fn fetch_blob(
        &self,
        id: &evp_core::ContentId,
    ) -> Result<Vec<u8>, StoreError> {
        retrying(&self.config.retry, "store.get", StoreError::is_transient, || {
            bounded(self.config.store_timeout, self.store.get(id), || {
                self.store_timeout("get")
            })
        })
        .await
    }

    pub(crate) fn ledger_timeout(&self, call: &str) -> LedgerError {
        LedgerError::Unavailable(format!(
            "ledger {call} timed out after {:?}",
            self.config.ledger_timeout
        ))
    }

    fn store_timeout(&self, call: &str) -> StoreError {
        StoreError::Unavailable {
            backend: self.store.backend(),
            reason: format!("{call} timed out after {:?}", self.config.store_timeout),
        }
    }
}
