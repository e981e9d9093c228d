//! # Payload Codec
//!
//! `encrypt(plaintext, passphrase)` derives a 256-bit key with Argon2id over
//! a fresh random salt, then seals the plaintext with AES-256-GCM under a
//! fresh random nonce. `decrypt` reads the parameters, salt and nonce back
//! out of the frame. A wrong passphrase and a tampered payload are both
//! reported as [`CryptoError::AuthenticationFailed`]; the codec never
//! returns bytes that differ from what was encrypted.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::passphrase::Passphrase;
use crate::payload::{EncryptedPayload, KdfParams, PayloadHeader, NONCE_LEN, SALT_LEN};

const KEY_LEN: usize = 32;

/// Passphrase-keyed authenticated encryption with configurable KDF cost.
///
/// The cost only affects encryption. Decryption uses whatever parameters the
/// payload carries (subject to the decoding ceiling).
#[derive(Debug, Clone, Copy, Default)]
pub struct CipherCodec {
    params: KdfParams,
}

impl CipherCodec {
    pub fn new(params: KdfParams) -> Result<Self, CryptoError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> KdfParams {
        self.params
    }

    /// Encrypt `plaintext` under `passphrase`. Empty plaintext is allowed.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        passphrase: &Passphrase,
    ) -> Result<EncryptedPayload, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .and_then(|()| OsRng.try_fill_bytes(&mut nonce))
            .map_err(|e| CryptoError::Randomness(e.to_string()))?;

        let header = PayloadHeader {
            params: self.params,
            salt,
            nonce,
        };
        let key = derive_key(passphrase, &header.salt, self.params)
            .map_err(|e| match e {
                CryptoError::MalformedPayload(msg) => CryptoError::KeyDerivation(msg),
                other => other,
            })?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        let aad = header.encode();
        let sealed = cipher
            .encrypt(
                Nonce::from_slice(&header.nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::Encryption("plaintext too large".to_string()))?;
        Ok(EncryptedPayload::assemble(header, sealed))
    }

    /// Decrypt a payload produced by any `CipherCodec`.
    pub fn decrypt(
        &self,
        payload: &EncryptedPayload,
        passphrase: &Passphrase,
    ) -> Result<Vec<u8>, CryptoError> {
        let header = payload.header();
        let key = derive_key(passphrase, &header.salt, header.params)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        cipher
            .decrypt(
                Nonce::from_slice(&header.nonce),
                Payload {
                    msg: payload.sealed(),
                    aad: payload.header_bytes(),
                },
            )
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}

/// Encrypt with the default ([`KdfParams::interactive`]) cost.
pub fn encrypt(plaintext: &[u8], passphrase: &Passphrase) -> Result<EncryptedPayload, CryptoError> {
    CipherCodec::default().encrypt(plaintext, passphrase)
}

/// Decrypt a payload. Parameters come from the payload itself.
pub fn decrypt(payload: &EncryptedPayload, passphrase: &Passphrase) -> Result<Vec<u8>, CryptoError> {
    CipherCodec::default().decrypt(payload, passphrase)
}

fn derive_key(
    passphrase: &Passphrase,
    salt: &[u8],
    params: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    params.validate()?;
    let argon_params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_LEN))
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon
        .hash_password_into(passphrase.as_bytes(), salt, key.as_mut_slice())
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}
