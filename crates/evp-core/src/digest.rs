//! # Content Digests
//!
//! [`ContentDigest`] carries its algorithm tag next to the 32 digest bytes so
//! stored identifiers stay self-describing (`sha256:<hex>`).
//!
//! Two construction paths exist:
//!
//! - [`sha256_digest()`] over [`CanonicalBytes`] for structured values
//!   (journal entries, authorizations).
//! - [`sha256_raw()`] over opaque bytes. Ciphertext blobs are not JSON and
//!   are addressed by their exact bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::ValidationError;

/// Hash algorithm that produced a [`ContentDigest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha256,
}

impl DigestAlgorithm {
    /// Prefix used in the textual form, e.g. `sha256`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// A content-addressed digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    pub algorithm: DigestAlgorithm,
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Wrap raw SHA-256 output.
    pub fn sha256(bytes: [u8; 32]) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            bytes,
        }
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Lowercase hex of the digest bytes, without the algorithm prefix.
    pub fn to_hex(&self) -> String {
        crate::hex::encode(&self.bytes)
    }

    /// Textual form `sha256:<hex>`.
    pub fn to_prefixed(&self) -> String {
        format!("{}:{}", self.algorithm.as_str(), self.to_hex())
    }

    /// Parse the textual form `sha256:<64 hex chars>`.
    pub fn parse_prefixed(s: &str) -> Result<Self, ValidationError> {
        let hex = s
            .strip_prefix("sha256:")
            .ok_or_else(|| ValidationError::InvalidDigest(s.to_string()))?;
        if hex.len() != 64 {
            return Err(ValidationError::InvalidDigest(s.to_string()));
        }
        let bytes = crate::hex::decode_array::<32>(hex)
            .map_err(|_| ValidationError::InvalidDigest(s.to_string()))?;
        Ok(Self::sha256(bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_prefixed())
    }
}

/// SHA-256 digest of canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    sha256_raw(data.as_bytes())
}

/// SHA-256 digest of opaque bytes (ciphertext blobs).
pub fn sha256_raw(data: &[u8]) -> ContentDigest {
    let out = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&out);
    ContentDigest::sha256(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input_matches_known_vector() {
        assert_eq!(
            sha256_raw(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn canonical_and_raw_agree_on_same_bytes() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_raw(br#"{"a":1}"#));
    }

    #[test]
    fn prefixed_roundtrip() {
        let d = sha256_raw(b"evidence");
        let text = d.to_prefixed();
        assert!(text.starts_with("sha256:"));
        assert_eq!(ContentDigest::parse_prefixed(&text).unwrap(), d);
    }

    #[test]
    fn parse_prefixed_rejects_malformed() {
        assert!(ContentDigest::parse_prefixed("md5:abcd").is_err());
        assert!(ContentDigest::parse_prefixed("sha256:abcd").is_err());
        assert!(ContentDigest::parse_prefixed(&format!("sha256:{}", "g".repeat(64))).is_err());
    }

    #[test]
    fn display_uses_prefixed_form() {
        let d = sha256_raw(b"x");
        assert_eq!(format!("{d}"), d.to_prefixed());
    }
}
