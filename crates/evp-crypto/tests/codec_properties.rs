//! Property tests for the payload codec.

use evp_crypto::{CipherCodec, CryptoError, EncryptedPayload, KdfParams, Passphrase};
use proptest::prelude::*;

fn codec() -> CipherCodec {
    CipherCodec::new(KdfParams::low_cost()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn decrypt_inverts_encrypt(
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
        secret in "[ -~]{1,64}",
    ) {
        let c = codec();
        let pass = Passphrase::new(secret).unwrap();
        let payload = c.encrypt(&plaintext, &pass).unwrap();
        prop_assert_eq!(c.decrypt(&payload, &pass).unwrap(), plaintext);
    }

    #[test]
    fn armor_survives_storage(
        plaintext in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let c = codec();
        let pass = Passphrase::new("armor").unwrap();
        let stored = c.encrypt(&plaintext, &pass).unwrap().to_armored().into_bytes();
        let fetched = EncryptedPayload::from_bytes(&stored).unwrap();
        prop_assert_eq!(c.decrypt(&fetched, &pass).unwrap(), plaintext);
    }

    #[test]
    fn distinct_passphrases_never_decrypt(
        a in "[a-z]{1,16}",
        b in "[a-z]{1,16}",
    ) {
        prop_assume!(a != b);
        let c = codec();
        let payload = c.encrypt(b"evidence", &Passphrase::new(a).unwrap()).unwrap();
        let result = c.decrypt(&payload, &Passphrase::new(b).unwrap());
        prop_assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn any_single_bit_flip_after_costs_is_rejected(
        plaintext in proptest::collection::vec(any::<u8>(), 1..128),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let c = codec();
        let pass = Passphrase::new("k").unwrap();
        let mut bytes = c.encrypt(&plaintext, &pass).unwrap().into_bytes();
        // Salt, nonce, ciphertext and tag. Cost fields are covered by the
        // decoding ceiling tests.
        let at = 17 + position.index(bytes.len() - 17);
        bytes[at] ^= 1 << bit;
        if let Ok(payload) = EncryptedPayload::from_bytes(&bytes) {
            prop_assert!(c.decrypt(&payload, &pass).is_err());
        }
    }
}

#[test]
fn truncation_at_every_length_is_rejected() {
    let c = codec();
    let pass = Passphrase::new("k").unwrap();
    let bytes = c.encrypt(b"truncate me", &pass).unwrap().into_bytes();
    for len in 0..bytes.len() {
        if let Ok(payload) = EncryptedPayload::from_bytes(&bytes[..len]) {
            assert!(c.decrypt(&payload, &pass).is_err(), "length {len} decrypted");
        }
    }
}
