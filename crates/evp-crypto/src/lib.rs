//! # evp-crypto: Cryptographic Primitives
//!
//! - **Payload codec** ([`cipher`]): Argon2id key derivation from a
//!   passphrase, AES-256-GCM authenticated encryption, fresh salt and nonce
//!   on every call.
//! - **Wire format** ([`payload`]): a self-describing frame that carries the
//!   KDF parameters, salt and nonce, so decryption needs only the payload and
//!   the passphrase.
//! - **Ed25519** ([`ed25519`]): key pairs and signatures used to authorize
//!   ledger appends.
//!
//! Confidentiality of evidence comes entirely from this crate. The content
//! store and the ledger only ever see ciphertext and content identifiers.

pub mod cipher;
pub mod ed25519;
pub mod error;
pub mod passphrase;
pub mod payload;

pub use cipher::{decrypt, encrypt, CipherCodec};
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use passphrase::Passphrase;
pub use payload::{EncryptedPayload, KdfParams};
