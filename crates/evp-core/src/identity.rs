//! # Identifier Newtypes
//!
//! You cannot pass a `ContentId` where a `SubmitterId` is expected, and an
//! `EvidenceId` of zero cannot be constructed.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum accepted length of a content identifier.
pub const MAX_CONTENT_ID_LEN: usize = 128;

// ---------------------------------------------------------------------------
// EvidenceId
// ---------------------------------------------------------------------------

/// Ledger-assigned evidence identifier. 1-based, dense, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct EvidenceId(u64);

impl EvidenceId {
    /// The first id a ledger hands out.
    pub const FIRST: EvidenceId = EvidenceId(1);

    /// Validate a raw id.
    pub fn new(id: u64) -> Result<Self, ValidationError> {
        if id == 0 {
            return Err(ValidationError::InvalidEvidenceId(id));
        }
        Ok(Self(id))
    }

    /// The id assigned to the `count + 1`-th record.
    pub fn after_count(count: u64) -> Self {
        Self(count.saturating_add(1))
    }

    /// Raw value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Zero-based position in an ordered record list.
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u64> for EvidenceId {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EvidenceId> for u64 {
    fn from(id: EvidenceId) -> Self {
        id.0
    }
}

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EvidenceId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidEvidenceId(0))?;
        Self::new(raw)
    }
}

// ---------------------------------------------------------------------------
// ContentId
// ---------------------------------------------------------------------------

/// Opaque identifier of a blob in the content store.
///
/// The format belongs to the store backend (`Qm…` CIDs for IPFS,
/// `sha256:<hex>` for the filesystem store). Only equality and round-trip
/// matter to the protocol. Validation keeps ids safe to embed in URLs and
/// file names: `[A-Za-z0-9]` first, then `[A-Za-z0-9:._-]`, at most
/// [`MAX_CONTENT_ID_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Validate and wrap a content identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let invalid = |reason: &str| ValidationError::InvalidContentId {
            value: id.clone(),
            reason: reason.to_string(),
        };
        if id.is_empty() {
            return Err(invalid("must be non-empty"));
        }
        if id.len() > MAX_CONTENT_ID_LEN {
            return Err(invalid("too long"));
        }
        if !id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("must start with an ASCII letter or digit"));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-')))
        {
            return Err(invalid(&format!("forbidden character {c:?}")));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Up to the first 8 characters, for display and file naming.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(8);
        &self.0[..end]
    }
}

impl TryFrom<String> for ContentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ContentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

// ---------------------------------------------------------------------------
// SubmitterId
// ---------------------------------------------------------------------------

/// Authenticated identity of the account that appended a record.
///
/// Derived by the ledger from the verified Ed25519 public key of the append
/// authorization: `ed25519:<64 lowercase hex chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubmitterId(String);

impl SubmitterId {
    /// Derive the identity of an Ed25519 public key.
    pub fn from_ed25519(public_key: &[u8; 32]) -> Self {
        Self(format!("ed25519:{}", crate::hex::encode(public_key)))
    }

    /// Parse the textual form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let hex = s
            .strip_prefix("ed25519:")
            .ok_or_else(|| ValidationError::InvalidSubmitterId(s.to_string()))?;
        let bytes = crate::hex::decode_array::<32>(hex)
            .map_err(|_| ValidationError::InvalidSubmitterId(s.to_string()))?;
        Ok(Self::from_ed25519(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for listings, e.g. `ed25519:3f9a1c…`.
    pub fn abbreviated(&self) -> String {
        let end = self.0.len().min("ed25519:".len() + 6);
        format!("{}…", &self.0[..end])
    }
}

impl TryFrom<String> for SubmitterId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SubmitterId> for String {
    fn from(id: SubmitterId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SubmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_id_rejects_zero() {
        assert!(EvidenceId::new(0).is_err());
        assert_eq!(EvidenceId::new(1).unwrap(), EvidenceId::FIRST);
    }

    #[test]
    fn evidence_id_serde_is_a_bare_integer() {
        let id = EvidenceId::new(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: EvidenceId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<EvidenceId>("0").is_err());
    }

    #[test]
    fn evidence_id_after_count_and_index() {
        let id = EvidenceId::after_count(4);
        assert_eq!(id.get(), 5);
        assert_eq!(id.index(), 4);
    }

    #[test]
    fn evidence_id_from_str() {
        assert_eq!("7".parse::<EvidenceId>().unwrap().get(), 7);
        assert!("0".parse::<EvidenceId>().is_err());
        assert!("x".parse::<EvidenceId>().is_err());
    }

    #[test]
    fn content_id_accepts_store_formats() {
        assert!(ContentId::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").is_ok());
        assert!(ContentId::new(format!("sha256:{}", "a".repeat(64))).is_ok());
        assert!(ContentId::new("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi").is_ok());
    }

    #[test]
    fn content_id_rejects_unsafe_values() {
        assert!(ContentId::new("").is_err());
        assert!(ContentId::new("../etc/passwd").is_err());
        assert!(ContentId::new("Qm abc").is_err());
        assert!(ContentId::new("Qm/abc").is_err());
        assert!(ContentId::new("a".repeat(MAX_CONTENT_ID_LEN + 1)).is_err());
    }

    #[test]
    fn content_id_short_prefix() {
        let id = ContentId::new("QmYwAPJzv5CZsnA").unwrap();
        assert_eq!(id.short(), "QmYwAPJz");
        assert_eq!(ContentId::new("abc").unwrap().short(), "abc");
    }

    #[test]
    fn submitter_id_from_key_and_parse() {
        let key = [0xabu8; 32];
        let id = SubmitterId::from_ed25519(&key);
        assert_eq!(id.as_str(), format!("ed25519:{}", "ab".repeat(32)));
        assert_eq!(SubmitterId::parse(id.as_str()).unwrap(), id);
        assert!(SubmitterId::parse("0xdeadbeef").is_err());
        assert!(SubmitterId::parse("ed25519:abcd").is_err());
    }

    #[test]
    fn submitter_id_abbreviated() {
        let id = SubmitterId::from_ed25519(&[0x12u8; 32]);
        assert_eq!(id.abbreviated(), "ed25519:121212…");
    }
}
