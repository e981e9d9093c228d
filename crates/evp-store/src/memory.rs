//! In-process content store.
//!
//! Same addressing as [`FsContentStore`](crate::FsContentStore). Supports
//! fault injection so orchestrator failure paths can be exercised without a
//! network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use evp_core::{sha256_raw, ContentId};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::{ContentMetadata, ContentStore};

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<ContentId, (Vec<u8>, ContentMetadata)>>,
    fail_puts: AtomicU32,
    fail_gets: AtomicU32,
    put_calls: AtomicUsize,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls to `put` fail with `Unavailable`.
    pub fn fail_next_puts(&self, n: u32) {
        self.fail_puts.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls to `get` fail with `Unavailable`.
    pub fn fail_next_gets(&self, n: u32) {
        self.fail_gets.store(n, Ordering::SeqCst);
    }

    /// Number of distinct blobs held.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.blobs.read().contains_key(id)
    }

    /// Total `put` attempts, including injected failures.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn metadata(&self, id: &ContentId) -> Option<ContentMetadata> {
        self.blobs.read().get(id).map(|(_, m)| m.clone())
    }

    /// Overwrite a stored blob in place, bypassing addressing.
    pub fn corrupt(&self, id: &ContentId, bytes: Vec<u8>) {
        if let Some(entry) = self.blobs.write().get_mut(id) {
            entry.0 = bytes;
        }
    }

    fn take_fault(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl ContentStore for MemoryContentStore {
    async fn put(
        &self,
        blob: &[u8],
        metadata: &ContentMetadata,
    ) -> Result<ContentId, StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_fault(&self.fail_puts) {
            return Err(StoreError::Unavailable {
                backend: "memory",
                reason: "injected put failure".to_string(),
            });
        }
        let id = ContentId::new(sha256_raw(blob).to_prefixed())?;
        self.blobs
            .write()
            .entry(id.clone())
            .or_insert_with(|| (blob.to_vec(), metadata.clone()));
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        if Self::take_fault(&self.fail_gets) {
            return Err(StoreError::Unavailable {
                backend: "memory",
                reason: "injected get failure".to_string(),
            });
        }
        self.blobs
            .read()
            .get(id)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_and_dedup() {
        let store = MemoryContentStore::new();
        let a = store.put(b"blob", &ContentMetadata::anonymous()).await.unwrap();
        let b = store.put(b"blob", &ContentMetadata::anonymous()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&a).await.unwrap(), b"blob");
    }

    #[tokio::test]
    async fn injected_put_failures_are_consumed() {
        let store = MemoryContentStore::new();
        store.fail_next_puts(2);
        let meta = ContentMetadata::anonymous();
        assert!(store.put(b"x", &meta).await.is_err());
        assert!(store.put(b"x", &meta).await.is_err());
        assert!(store.put(b"x", &meta).await.is_ok());
        assert_eq!(store.put_calls(), 3);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn injected_get_failure_is_transient() {
        let store = MemoryContentStore::new();
        let id = store.put(b"x", &ContentMetadata::anonymous()).await.unwrap();
        store.fail_next_gets(1);
        let err = store.get(&id).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(store.get(&id).await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryContentStore::new();
        let id = ContentId::new("QmNothing").unwrap();
        assert!(matches!(store.get(&id).await, Err(StoreError::NotFound(_))));
    }
}
