//! Passphrase wrapper. Zeroized on drop, redacted in `Debug`.

use evp_core::ValidationError;
use zeroize::Zeroizing;

/// Secret from which the symmetric key is derived.
///
/// Never transmitted, never persisted, never logged.
#[derive(Clone)]
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    /// Wrap a passphrase. Empty passphrases are rejected.
    pub fn new(secret: impl Into<String>) -> Result<Self, ValidationError> {
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            return Err(ValidationError::EmptyPassphrase);
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

impl TryFrom<&str> for Passphrase {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert_eq!(Passphrase::new("").unwrap_err(), ValidationError::EmptyPassphrase);
    }

    #[test]
    fn debug_is_redacted() {
        let p = Passphrase::new("correct-key").unwrap();
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("correct-key"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn whitespace_is_significant() {
        let a = Passphrase::new("key").unwrap();
        let b = Passphrase::new("key ").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
