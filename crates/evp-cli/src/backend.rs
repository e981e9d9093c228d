//! Concrete store, ledger and signer wiring for the configured deployment.

use std::path::Path;

use anyhow::{Context, Result};

use evp_core::ContentId;
use evp_crypto::Ed25519KeyPair;
use evp_ledger::{AppendAuthorization, Authorizer, Ed25519Authorizer, JournalLedger, LedgerError};
use evp_protocol::EvidenceService;
use evp_store::{
    ContentMetadata, ContentStore, FsContentStore, PinataConfig, PinataStore, StoreError,
};

use crate::config::{CliConfig, StoreBackend};

pub type CliService = EvidenceService<CliStore, JournalLedger, Signer>;

/// The store backend selected in the configuration.
#[derive(Debug)]
pub enum CliStore {
    Fs(FsContentStore),
    Pinata(PinataStore),
}

impl CliStore {
    pub fn from_config(backend: &StoreBackend) -> Result<Self> {
        match backend {
            StoreBackend::Fs { path } => Ok(Self::Fs(FsContentStore::new(path))),
            StoreBackend::Pinata => {
                let config = PinataConfig::from_env().context("pinata store is not configured")?;
                Ok(Self::Pinata(PinataStore::new(config)?))
            }
        }
    }
}

impl ContentStore for CliStore {
    async fn put(&self, blob: &[u8], metadata: &ContentMetadata) -> Result<ContentId, StoreError> {
        match self {
            Self::Fs(store) => store.put(blob, metadata).await,
            Self::Pinata(store) => store.put(blob, metadata).await,
        }
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        match self {
            Self::Fs(store) => store.get(id).await,
            Self::Pinata(store) => store.get(id).await,
        }
    }

    fn backend(&self) -> &'static str {
        match self {
            Self::Fs(store) => store.backend(),
            Self::Pinata(store) => store.backend(),
        }
    }
}

/// Signing capability. Read-only commands run without a key; any append
/// attempted without one is declined.
#[derive(Debug)]
pub struct Signer(Option<Ed25519Authorizer>);

impl Signer {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn with_key(key: Ed25519KeyPair) -> Self {
        Self(Some(Ed25519Authorizer::new(key)))
    }
}

impl Authorizer for Signer {
    fn authorize(
        &self,
        ledger_id: &str,
        content_id: &ContentId,
    ) -> Result<AppendAuthorization, LedgerError> {
        match &self.0 {
            Some(inner) => inner.authorize(ledger_id, content_id),
            None => Err(LedgerError::AuthorizationDeclined(
                "no signing key loaded".to_string(),
            )),
        }
    }
}

/// Read a hex-encoded Ed25519 seed written by `evp keygen`.
pub fn load_key(path: &Path) -> Result<Ed25519KeyPair> {
    let text = zeroize::Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read signing key: {}", path.display()))?,
    );
    Ed25519KeyPair::from_seed_hex(text.trim())
        .with_context(|| format!("invalid signing key: {}", path.display()))
}

/// Build the service for `config`. `signer` is only needed for appends.
pub async fn open_service(config: &CliConfig, signer: Signer) -> Result<CliService> {
    let store = CliStore::from_config(&config.store)?;
    let ledger = JournalLedger::open(&config.journal)
        .await
        .with_context(|| format!("failed to open ledger journal: {}", config.journal.display()))?;
    tracing::debug!(
        store = store.backend(),
        ledger = evp_ledger::EvidenceLedger::ledger_id(&ledger),
        "service ready"
    );
    Ok(EvidenceService::new(store, ledger, signer, config.protocol()).with_codec(config.codec()?))
}
