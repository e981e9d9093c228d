//! # Append Authorization
//!
//! An append is executed under the submitter's authenticated identity. The
//! submitter signs a statement naming the ledger instance, the content id
//! and a fresh nonce:
//!
//! ```json
//! {"content_id":"Qm…","domain":"evp.append.v1","ledger":"evp-ledger-…","nonce":"<32 hex>"}
//! ```
//!
//! The statement is canonicalized before signing, so the ledger rebuilds the
//! same bytes from the authorization's fields. On verification the ledger
//! learns the submitter's [`SubmitterId`]; it never takes one from the
//! caller. Binding the ledger id prevents an authorization for one ledger
//! from being replayed against another; the nonce prevents replay against
//! the same one.

use evp_core::{hex, CanonicalBytes, ContentId, SubmitterId};
use evp_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LedgerError;

/// Domain separator for append statements.
pub const APPEND_DOMAIN: &str = "evp.append.v1";

/// 16 random bytes, single use per ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppendNonce([u8; 16]);

impl AppendNonce {
    pub fn generate() -> Result<Self, LedgerError> {
        let mut raw = [0u8; 16];
        rand::rngs::OsRng
            .try_fill_bytes(&mut raw)
            .map_err(|e| LedgerError::AuthorizationDeclined(format!("nonce generation: {e}")))?;
        Ok(Self(raw))
    }

    pub fn from_bytes(raw: [u8; 16]) -> Self {
        Self(raw)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Debug for AppendNonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AppendNonce({})", self.to_hex())
    }
}

impl std::fmt::Display for AppendNonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for AppendNonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AppendNonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode_array::<16>(&s)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize)]
struct AppendStatement<'a> {
    domain: &'static str,
    ledger: &'a str,
    content_id: &'a ContentId,
    nonce: &'a AppendNonce,
}

/// Canonical bytes a submitter signs to authorize one append.
pub fn statement_bytes(
    ledger_id: &str,
    content_id: &ContentId,
    nonce: &AppendNonce,
) -> Result<CanonicalBytes, LedgerError> {
    Ok(CanonicalBytes::new(&AppendStatement {
        domain: APPEND_DOMAIN,
        ledger: ledger_id,
        content_id,
        nonce,
    })?)
}

/// A signed permission to append `content_id` to `ledger_id` once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendAuthorization {
    pub ledger_id: String,
    pub content_id: ContentId,
    pub nonce: AppendNonce,
    pub public_key: Ed25519PublicKey,
    pub signature: Ed25519Signature,
}

impl AppendAuthorization {
    /// Sign an authorization with `key`.
    pub fn sign(
        key: &Ed25519KeyPair,
        ledger_id: &str,
        content_id: &ContentId,
        nonce: AppendNonce,
    ) -> Result<Self, LedgerError> {
        let statement = statement_bytes(ledger_id, content_id, &nonce)?;
        Ok(Self {
            ledger_id: ledger_id.to_string(),
            content_id: content_id.clone(),
            nonce,
            public_key: key.public_key(),
            signature: key.sign(&statement),
        })
    }

    /// Verify against `expected_ledger` and return the authenticated
    /// submitter. Nonce freshness is the ledger's job.
    pub fn verify(&self, expected_ledger: &str) -> Result<SubmitterId, LedgerError> {
        if self.ledger_id != expected_ledger {
            return Err(LedgerError::WrongLedger {
                expected: expected_ledger.to_string(),
                actual: self.ledger_id.clone(),
            });
        }
        let statement = statement_bytes(&self.ledger_id, &self.content_id, &self.nonce)?;
        self.public_key
            .verify(&statement, &self.signature)
            .map_err(|e| LedgerError::Unauthorized(e.to_string()))?;
        Ok(self.public_key.submitter_id())
    }
}

/// Produces append authorizations on behalf of a submitter.
///
/// An implementation may decline with
/// [`LedgerError::AuthorizationDeclined`]; the ledger then records nothing.
pub trait Authorizer: Send + Sync {
    fn authorize(
        &self,
        ledger_id: &str,
        content_id: &ContentId,
    ) -> Result<AppendAuthorization, LedgerError>;
}

impl<A: Authorizer + ?Sized> Authorizer for std::sync::Arc<A> {
    fn authorize(
        &self,
        ledger_id: &str,
        content_id: &ContentId,
    ) -> Result<AppendAuthorization, LedgerError> {
        (**self).authorize(ledger_id, content_id)
    }
}

/// Signs every request with a held Ed25519 key.
#[derive(Debug)]
pub struct Ed25519Authorizer {
    key: Ed25519KeyPair,
}

impl Ed25519Authorizer {
    pub fn new(key: Ed25519KeyPair) -> Self {
        Self { key }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }

    /// Identity the ledger records for appends made with this authorizer.
    pub fn submitter_id(&self) -> SubmitterId {
        self.key.submitter_id()
    }
}

impl Authorizer for Ed25519Authorizer {
    fn authorize(
        &self,
        ledger_id: &str,
        content_id: &ContentId,
    ) -> Result<AppendAuthorization, LedgerError> {
        AppendAuthorization::sign(&self.key, ledger_id, content_id, AppendNonce::generate()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(s: &str) -> ContentId {
        ContentId::new(s).unwrap()
    }

    #[test]
    fn statement_is_canonical_and_domain_separated() {
        let nonce = AppendNonce::from_bytes([0xab; 16]);
        let bytes = statement_bytes("L1", &cid("QmA"), &nonce).unwrap();
        let text = std::str::from_utf8(bytes.as_bytes()).unwrap();
        assert_eq!(
            text,
            format!(
                r#"{{"content_id":"QmA","domain":"evp.append.v1","ledger":"L1","nonce":"{}"}}"#,
                "ab".repeat(16)
            )
        );
    }

    #[test]
    fn signed_authorization_verifies_and_yields_signer() {
        let key = Ed25519KeyPair::from_seed(&[4u8; 32]);
        let expected = key.submitter_id();
        let auth = Ed25519Authorizer::new(key)
            .authorize("L1", &cid("QmA"))
            .unwrap();
        assert_eq!(auth.verify("L1").unwrap(), expected);
    }

    #[test]
    fn wrong_ledger_is_rejected() {
        let auth = Ed25519Authorizer::new(Ed25519KeyPair::generate())
            .authorize("L1", &cid("QmA"))
            .unwrap();
        assert!(matches!(
            auth.verify("L2"),
            Err(LedgerError::WrongLedger { .. })
        ));
    }

    #[test]
    fn swapped_content_id_is_rejected() {
        let mut auth = Ed25519Authorizer::new(Ed25519KeyPair::generate())
            .authorize("L1", &cid("QmA"))
            .unwrap();
        auth.content_id = cid("QmB");
        assert!(matches!(auth.verify("L1"), Err(LedgerError::Unauthorized(_))));
    }

    #[test]
    fn substituted_public_key_is_rejected() {
        let mut auth = Ed25519Authorizer::new(Ed25519KeyPair::generate())
            .authorize("L1", &cid("QmA"))
            .unwrap();
        auth.public_key = Ed25519KeyPair::generate().public_key();
        assert!(matches!(auth.verify("L1"), Err(LedgerError::Unauthorized(_))));
    }

    #[test]
    fn nonces_are_fresh() {
        let a = AppendNonce::generate().unwrap();
        let b = AppendNonce::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn authorization_serde_round_trip() {
        let auth = Ed25519Authorizer::new(Ed25519KeyPair::from_seed(&[5u8; 32]))
            .authorize("L1", &cid("QmA"))
            .unwrap();
        let json = serde_json::to_string(&auth).unwrap();
        let back: AppendAuthorization = serde_json::from_str(&json).unwrap();
        assert_eq!(back, auth);
        back.verify("L1").unwrap();
    }
}
