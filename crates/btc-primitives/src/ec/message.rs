//! Bitcoin Signed Message: compact signatures over a prefixed message digest.

use crate::ec::KeyPair;
use crate::hash::sha256d;
use crate::util::ByteWriter;
use crate::PrimitivesError;

const MESSAGE_MAGIC: &[u8] = b"Bitcoin Signed Message:\n";

/// `sha256d(varstr(magic) || varstr(message))`.
pub fn message_hash(message: &[u8]) -> [u8; 32] {
    let mut w = ByteWriter::with_capacity(MESSAGE_MAGIC.len() + message.len() + 10);
    w.write_var_bytes(MESSAGE_MAGIC);
    w.write_var_bytes(message);
    sha256d(w.as_bytes())
}

/// Sign `message` with a 65-byte compact signature.
pub fn sign_message(key: &KeyPair, message: &[u8]) -> Result<[u8; 65], PrimitivesError> {
    key.sign_compact(&message_hash(message))
}

/// Recover the public key that produced `signature` over `message`.
pub fn recover_message_signer(signature: &[u8], message: &[u8]) -> Result<KeyPair, PrimitivesError> {
    KeyPair::recover_compact(signature, &message_hash(message))
}

/// True when `signature` recovers to `key` with the same compression flag,
/// so the signer's address matches.
pub fn verify_message(key: &KeyPair, signature: &[u8], message: &[u8]) -> bool {
    recover_message_signer(signature, message)
        .is_ok_and(|k| k.public_point() == key.public_point() && k.is_compressed() == key.is_compressed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Network;

    const SIGNATURE: &str = "1b158259bd8eeb198babbcc4308cdfb8e8068f0a712cac634257933a072ea6db\
                             7beb3308f4c937d4f397a2a782bf12884045c27430719a2890f0127b4732d9cf0d";

    fn test_key() -> KeyPair {
        KeyPair::from_secret(
            &hex::decode("c4bbcb1fbec99d65bf59d85c8cb62ee2db963f0fe106f483d9afa73bd4e39a8a").unwrap(),
        )
        .unwrap()
        .with_compressed(false)
    }

    #[test]
    fn test_known_signature_recovers_address() {
        let sig = hex::decode(SIGNATURE).unwrap();
        let signer = recover_message_signer(&sig, b"Test message").unwrap();
        assert!(!signer.is_compressed());
        assert_eq!(signer.address(Network::Mainnet), "1JwSSubhmg6iPtRjtyqhUYYH7bZg3Lfy1T");
        assert!(verify_message(&test_key(), &sig, b"Test message"));
        assert!(!verify_message(&test_key(), &sig, b"Test message!"));
    }

    #[test]
    fn test_sign_then_verify() {
        for compressed in [false, true] {
            let key = test_key().with_compressed(compressed);
            let sig = sign_message(&key, b"hello world").unwrap();
            assert!(verify_message(&key, &sig, b"hello world"));
            // Same point, other compression flag: a different address.
            assert!(!verify_message(&key.clone().with_compressed(!compressed), &sig, b"hello world"));
        }
    }

    #[test]
    fn test_message_hash_prefix() {
        // 0x18 = len("Bitcoin Signed Message:\n"), then 0x00 for an empty message.
        let mut w = ByteWriter::new();
        w.write_u8(0x18);
        w.write_bytes(MESSAGE_MAGIC);
        w.write_u8(0x00);
        assert_eq!(message_hash(b""), sha256d(w.as_bytes()));
    }
}
