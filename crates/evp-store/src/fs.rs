//! # Filesystem Content Store
//!
//! Blobs live at `{base_dir}/blobs/{digest_hex}` with a metadata sidecar at
//! `{base_dir}/blobs/{digest_hex}.meta.json`. The identifier is
//! `sha256:{digest_hex}` of the stored bytes.
//!
//! ## Integrity Invariant
//!
//! On every read the digest is recomputed and compared, in constant time,
//! with the one encoded in the identifier. Corruption is reported as
//! [`StoreError::Integrity`], never returned as data.
//!
//! A blob becomes visible only through an atomic rename of a fully written,
//! synced temporary file, so a crash mid-`put` leaves either nothing or the
//! complete blob.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use evp_core::{sha256_raw, ContentDigest, ContentId};
use subtle::ConstantTimeEq;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;
use crate::store::{ContentMetadata, ContentStore};

static PARTIAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// A content store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    base_dir: PathBuf,
}

impl FsContentStore {
    /// The directory is created on the first `put`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn blob_dir(&self) -> PathBuf {
        self.base_dir.join("blobs")
    }

    fn blob_path(&self, digest: &ContentDigest) -> PathBuf {
        self.blob_dir().join(digest.to_hex())
    }

    fn meta_path(&self, digest: &ContentDigest) -> PathBuf {
        self.blob_dir().join(format!("{}.meta.json", digest.to_hex()))
    }

    /// Whether a blob with this identifier is present.
    pub async fn contains(&self, id: &ContentId) -> Result<bool, StoreError> {
        let Ok(digest) = ContentDigest::parse_prefixed(id.as_str()) else {
            return Ok(false);
        };
        Ok(tokio::fs::try_exists(self.blob_path(&digest)).await?)
    }

    /// Read the metadata sidecar for a stored blob.
    pub async fn metadata(&self, id: &ContentId) -> Result<ContentMetadata, StoreError> {
        let digest = parse_id(id)?;
        let raw = match tokio::fs::read(self.meta_path(&digest)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw).map_err(|e| StoreError::InvalidResponse {
            endpoint: self.meta_path(&digest).display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = target.with_file_name(format!(
            ".{file_name}.{}-{}.partial",
            std::process::id(),
            PARTIAL_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, target).await?;
        Ok(())
    }
}

fn parse_id(id: &ContentId) -> Result<ContentDigest, StoreError> {
    // Identifiers from other backends cannot be held here.
    ContentDigest::parse_prefixed(id.as_str()).map_err(|_| StoreError::NotFound(id.clone()))
}

impl ContentStore for FsContentStore {
    async fn put(
        &self,
        blob: &[u8],
        metadata: &ContentMetadata,
    ) -> Result<ContentId, StoreError> {
        let digest = sha256_raw(blob);
        let id = ContentId::new(digest.to_prefixed())?;
        tokio::fs::create_dir_all(self.blob_dir()).await?;

        let path = self.blob_path(&digest);
        let meta_path = self.meta_path(&digest);
        let meta = serde_json::to_vec_pretty(metadata).map_err(|e| StoreError::InvalidResponse {
            endpoint: "metadata".to_string(),
            reason: e.to_string(),
        })?;

        if tokio::fs::try_exists(&path).await? {
            // A sidecar lost to an interrupted put is restored; an existing one is kept.
            if !tokio::fs::try_exists(&meta_path).await? {
                tracing::info!(content_id = %id, "restoring missing metadata sidecar");
                self.write_atomic(&meta_path, &meta).await?;
            }
            tracing::debug!(content_id = %id, "blob already present");
            return Ok(id);
        }

        self.write_atomic(&path, blob).await?;
        self.write_atomic(&meta_path, &meta).await?;

        tracing::info!(content_id = %id, bytes = blob.len(), "stored blob");
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        let digest = parse_id(id)?;
        let bytes = match tokio::fs::read(self.blob_path(&digest)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        let actual = sha256_raw(&bytes);
        if !bool::from(actual.as_bytes().as_slice().ct_eq(digest.as_bytes().as_slice())) {
            tracing::warn!(content_id = %id, "stored blob failed integrity check");
            return Err(StoreError::Integrity {
                content_id: id.clone(),
                actual: actual.to_prefixed(),
            });
        }
        Ok(bytes)
    }

    fn backend(&self) -> &'static str {
        "fs"
    }
}
