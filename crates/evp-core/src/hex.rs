//! Lowercase hex encoding helpers shared across the workspace.

use crate::error::ValidationError;

/// Encode bytes as a lowercase hex string.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (either case) into bytes.
pub fn decode(hex: &str) -> Result<Vec<u8>, ValidationError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex(
            "hex string must have even length".to_string(),
        ));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ValidationError::InvalidHex(format!("invalid hex at position {i}")))
        })
        .collect()
}

/// Decode a hex string into a fixed-size array.
pub fn decode_array<const N: usize>(hex: &str) -> Result<[u8; N], ValidationError> {
    let bytes = decode(hex)?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        ValidationError::InvalidHex(format!("expected {N} bytes, got {}", v.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_lowercase() {
        assert_eq!(encode(&[0xde, 0xad, 0xBE, 0xef]), "deadbeef");
    }

    #[test]
    fn decode_accepts_uppercase() {
        assert_eq!(decode("DEADbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn decode_rejects_odd_length_and_garbage() {
        assert!(decode("abc").is_err());
        assert!(decode("zz").is_err());
        // Multi-byte UTF-8 must not panic on slicing.
        assert!(decode("é1").is_err());
    }

    #[test]
    fn decode_array_checks_length() {
        assert_eq!(decode_array::<2>("0102").unwrap(), [1, 2]);
        assert!(decode_array::<3>("0102").is_err());
    }
}
