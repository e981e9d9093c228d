//! # Cryptographic Error Types

use evp_core::{EvidenceError, ValidationError};
use thiserror::Error;

/// Errors from codec and signing operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The AEAD tag did not verify: wrong passphrase or tampered payload.
    #[error("authentication failed: wrong passphrase or corrupted ciphertext")]
    AuthenticationFailed,

    /// The payload is not a well-formed frame (bad magic, truncated, bad params).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Argon2 rejected the parameters or failed to derive a key.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The operating system RNG failed.
    #[error("random number generation failed: {0}")]
    Randomness(String),

    /// AES-GCM refused to encrypt (plaintext too large).
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Invalid Ed25519 key material.
    #[error("invalid Ed25519 key: {0}")]
    KeyError(String),

    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<CryptoError> for EvidenceError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::AuthenticationFailed | CryptoError::MalformedPayload(_) => {
                EvidenceError::Decryption(err.to_string())
            }
            CryptoError::Validation(v) => EvidenceError::Validation(v),
            CryptoError::KeyDerivation(_)
            | CryptoError::Randomness(_)
            | CryptoError::Encryption(_)
            | CryptoError::KeyError(_)
            | CryptoError::VerificationFailed(_) => EvidenceError::Encryption(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failure_maps_to_decryption() {
        let err: EvidenceError = CryptoError::AuthenticationFailed.into();
        assert!(matches!(err, EvidenceError::Decryption(_)));
    }

    #[test]
    fn malformed_payload_maps_to_decryption() {
        let err: EvidenceError = CryptoError::MalformedPayload("truncated".into()).into();
        match err {
            EvidenceError::Decryption(msg) => assert!(msg.contains("truncated")),
            other => panic!("expected Decryption, got {other:?}"),
        }
    }

    #[test]
    fn empty_passphrase_maps_to_validation() {
        let err: EvidenceError = CryptoError::from(ValidationError::EmptyPassphrase).into();
        assert!(matches!(
            err,
            EvidenceError::Validation(ValidationError::EmptyPassphrase)
        ));
    }

    #[test]
    fn rng_failure_maps_to_encryption() {
        let err: EvidenceError = CryptoError::Randomness("entropy".into()).into();
        assert!(matches!(err, EvidenceError::Encryption(_)));
    }
}
