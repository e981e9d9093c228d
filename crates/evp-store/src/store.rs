//! The [`ContentStore`] capability and the metadata attached to each blob.

use std::future::Future;

use evp_core::ContentId;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Descriptive metadata pinned alongside a blob.
///
/// Metadata is informational only. It never affects the content identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    /// Display name of the stored object, e.g. `report.pdf.encrypted`.
    pub name: String,
    /// Name of the document before encryption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl ContentMetadata {
    /// Metadata for the encrypted form of `file_name`.
    pub fn for_encrypted_file(file_name: &str) -> Self {
        Self {
            name: format!("{file_name}.encrypted"),
            original_name: Some(file_name.to_string()),
        }
    }

    /// Metadata for a blob with no originating file.
    pub fn anonymous() -> Self {
        Self {
            name: "evidence.encrypted".to_string(),
            original_name: None,
        }
    }
}

/// Durable, content-addressed blob storage.
///
/// - `put` of identical bytes yields the same identifier.
/// - `get(put(b))` returns `b` for as long as the blob is retained.
/// - Implementations perform no retries.
pub trait ContentStore: Send + Sync {
    /// Store `blob` and return its content identifier.
    fn put(
        &self,
        blob: &[u8],
        metadata: &ContentMetadata,
    ) -> impl Future<Output = Result<ContentId, StoreError>> + Send;

    /// Fetch the bytes previously stored under `id`.
    fn get(&self, id: &ContentId) -> impl Future<Output = Result<Vec<u8>, StoreError>> + Send;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypted_file_metadata_names() {
        let m = ContentMetadata::for_encrypted_file("photo.jpg");
        assert_eq!(m.name, "photo.jpg.encrypted");
        assert_eq!(m.original_name.as_deref(), Some("photo.jpg"));
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let m = ContentMetadata::for_encrypted_file("a.txt");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["originalName"], "a.txt");
        assert_eq!(json["name"], "a.txt.encrypted");
    }

    #[test]
    fn anonymous_metadata_omits_original_name() {
        let json = serde_json::to_value(ContentMetadata::anonymous()).unwrap();
        assert!(json.get("originalName").is_none());
    }
}
