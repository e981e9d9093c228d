//! # Encrypted Payload Wire Format
//!
//! ```text
//! offset  size  field
//! 0       4     magic "EVP1"
//! 4       1     format version (1)
//! 5       4     argon2 m_cost, KiB (u32 big-endian)
//! 9       4     argon2 t_cost (u32 big-endian)
//! 13      4     argon2 p_cost (u32 big-endian)
//! 17      16    salt
//! 33      12    AES-GCM nonce
//! 45      ..    ciphertext || 16-byte tag
//! ```
//!
//! The 45-byte header is passed to AES-GCM as associated data, so any change
//! to the parameters, salt or nonce fails authentication.
//!
//! Payloads are stored in the content store in their armored form (standard
//! base64 of the frame). [`EncryptedPayload::from_bytes`] accepts either the
//! raw frame or its armor.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CryptoError;

pub(crate) const MAGIC: &[u8; 4] = b"EVP1";
pub(crate) const FORMAT_VERSION: u8 = 1;
pub(crate) const SALT_LEN: usize = 16;
pub(crate) const NONCE_LEN: usize = 12;
pub(crate) const TAG_LEN: usize = 16;
pub(crate) const HEADER_LEN: usize = 4 + 1 + 12 + SALT_LEN + NONCE_LEN;

/// Upper bounds accepted when decoding, so a crafted payload cannot make the
/// reader allocate gigabytes or spin for minutes.
const MAX_M_COST_KIB: u32 = 1024 * 1024;
const MAX_T_COST: u32 = 16;
const MAX_P_COST: u32 = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Iterations.
    pub t_cost: u32,
    /// Lanes.
    pub p_cost: u32,
}

impl KdfParams {
    /// 19 MiB, 2 passes, 1 lane.
    pub const fn interactive() -> Self {
        Self {
            m_cost: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }

    /// 64 MiB, 3 passes, 4 lanes.
    pub const fn sensitive() -> Self {
        Self {
            m_cost: 64 * 1024,
            t_cost: 3,
            p_cost: 4,
        }
    }

    /// Minimum Argon2 cost. For tests and development only.
    pub const fn low_cost() -> Self {
        Self {
            m_cost: 8,
            t_cost: 1,
            p_cost: 1,
        }
    }

    /// Check the parameters against Argon2's minimums and this crate's
    /// decoding ceiling.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.p_cost == 0 || self.p_cost > MAX_P_COST {
            return Err(CryptoError::MalformedPayload(format!(
                "p_cost {} outside 1..={MAX_P_COST}",
                self.p_cost
            )));
        }
        if self.t_cost == 0 || self.t_cost > MAX_T_COST {
            return Err(CryptoError::MalformedPayload(format!(
                "t_cost {} outside 1..={MAX_T_COST}",
                self.t_cost
            )));
        }
        let min_m = 8 * self.p_cost;
        if self.m_cost < min_m || self.m_cost > MAX_M_COST_KIB {
            return Err(CryptoError::MalformedPayload(format!(
                "m_cost {} KiB outside {min_m}..={MAX_M_COST_KIB}",
                self.m_cost
            )));
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Parsed view of a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PayloadHeader {
    pub params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
}

impl PayloadHeader {
    pub(crate) fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(MAGIC);
        out[4] = FORMAT_VERSION;
        out[5..9].copy_from_slice(&self.params.m_cost.to_be_bytes());
        out[9..13].copy_from_slice(&self.params.t_cost.to_be_bytes());
        out[13..17].copy_from_slice(&self.params.p_cost.to_be_bytes());
        out[17..17 + SALT_LEN].copy_from_slice(&self.salt);
        out[17 + SALT_LEN..].copy_from_slice(&self.nonce);
        out
    }

    fn decode(frame: &[u8]) -> Result<Self, CryptoError> {
        if frame.len() < HEADER_LEN + TAG_LEN {
            return Err(CryptoError::MalformedPayload(format!(
                "payload is {} bytes, minimum is {}",
                frame.len(),
                HEADER_LEN + TAG_LEN
            )));
        }
        if &frame[..4] != MAGIC {
            return Err(CryptoError::MalformedPayload("bad magic".to_string()));
        }
        if frame[4] != FORMAT_VERSION {
            return Err(CryptoError::MalformedPayload(format!(
                "unsupported format version {}",
                frame[4]
            )));
        }
        let params = KdfParams {
            m_cost: read_u32(frame, 5),
            t_cost: read_u32(frame, 9),
            p_cost: read_u32(frame, 13),
        };
        params.validate()?;
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&frame[17..17 + SALT_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&frame[17 + SALT_LEN..HEADER_LEN]);
        Ok(Self {
            params,
            salt,
            nonce,
        })
    }
}

fn read_u32(frame: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&frame[at..at + 4]);
    u32::from_be_bytes(buf)
}

/// Ciphertext bundled with everything needed to decrypt it except the
/// passphrase.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    frame: Vec<u8>,
    header: PayloadHeader,
}

impl EncryptedPayload {
    pub(crate) fn assemble(header: PayloadHeader, sealed: Vec<u8>) -> Self {
        let mut frame = Vec::with_capacity(HEADER_LEN + sealed.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(&sealed);
        Self { frame, header }
    }

    /// Parse a raw frame or its base64 armor.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.starts_with(MAGIC) {
            return Self::from_frame(bytes.to_vec());
        }
        let text = std::str::from_utf8(bytes)
            .map_err(|_| CryptoError::MalformedPayload("neither a frame nor armor".to_string()))?;
        Self::from_armored(text)
    }

    /// Parse the base64 armor produced by [`to_armored`](Self::to_armored).
    pub fn from_armored(text: &str) -> Result<Self, CryptoError> {
        let frame = STANDARD
            .decode(text.trim())
            .map_err(|e| CryptoError::MalformedPayload(format!("invalid base64 armor: {e}")))?;
        Self::from_frame(frame)
    }

    fn from_frame(frame: Vec<u8>) -> Result<Self, CryptoError> {
        let header = PayloadHeader::decode(&frame)?;
        Ok(Self { frame, header })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.frame
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.frame
    }

    pub fn to_armored(&self) -> String {
        STANDARD.encode(&self.frame)
    }

    /// KDF parameters the payload was sealed with.
    pub fn kdf_params(&self) -> KdfParams {
        self.header.params
    }

    pub(crate) fn header(&self) -> &PayloadHeader {
        &self.header
    }

    pub(crate) fn header_bytes(&self) -> &[u8] {
        &self.frame[..HEADER_LEN]
    }

    pub(crate) fn sealed(&self) -> &[u8] {
        &self.frame[HEADER_LEN..]
    }
}

impl std::fmt::Debug for EncryptedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedPayload")
            .field("len", &self.frame.len())
            .field("kdf", &self.header.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedPayload {
        let header = PayloadHeader {
            params: KdfParams::low_cost(),
            salt: [1u8; SALT_LEN],
            nonce: [2u8; NONCE_LEN],
        };
        EncryptedPayload::assemble(header, vec![0xAB; TAG_LEN + 5])
    }

    #[test]
    fn header_layout() {
        let p = sample();
        let bytes = p.as_bytes();
        assert_eq!(&bytes[..4], b"EVP1");
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..9], &8u32.to_be_bytes());
        assert_eq!(bytes.len(), HEADER_LEN + TAG_LEN + 5);
    }

    #[test]
    fn raw_and_armored_parse_to_same_payload() {
        let p = sample();
        let raw = EncryptedPayload::from_bytes(p.as_bytes()).unwrap();
        let armored = EncryptedPayload::from_bytes(p.to_armored().as_bytes()).unwrap();
        assert_eq!(raw, p);
        assert_eq!(armored, p);
    }

    #[test]
    fn armor_tolerates_trailing_newline() {
        let p = sample();
        let text = format!("{}\n", p.to_armored());
        assert_eq!(EncryptedPayload::from_armored(&text).unwrap(), p);
    }

    #[test]
    fn rejects_truncated() {
        let p = sample();
        let err = EncryptedPayload::from_bytes(&p.as_bytes()[..HEADER_LEN + 3]).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedPayload(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = sample().into_bytes();
        bytes[4] = 9;
        assert!(EncryptedPayload::from_bytes(&bytes).is_err());
    }

    #[test]
    fn rejects_excessive_memory_cost() {
        let mut bytes = sample().into_bytes();
        bytes[5..9].copy_from_slice(&u32::MAX.to_be_bytes());
        let err = EncryptedPayload::from_bytes(&bytes).unwrap_err();
        assert!(format!("{err}").contains("m_cost"));
    }

    #[test]
    fn rejects_garbage_text() {
        assert!(EncryptedPayload::from_bytes(b"not a payload at all").is_err());
        assert!(EncryptedPayload::from_bytes(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn presets_validate() {
        KdfParams::interactive().validate().unwrap();
        KdfParams::sensitive().validate().unwrap();
        KdfParams::low_cost().validate().unwrap();
    }

    #[test]
    fn memory_floor_scales_with_lanes() {
        let params = KdfParams {
            m_cost: 8,
            t_cost: 1,
            p_cost: 2,
        };
        assert!(params.validate().is_err());
    }
}
