//! Base58Check collaborator.
//!
//! Addresses, WIF secrets and extended keys are all Base58Check strings:
//! the payload followed by the first four bytes of its SHA-256d, encoded
//! with the Bitcoin alphabet.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Encode raw bytes with the Bitcoin Base58 alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Bitcoin-alphabet Base58 string.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Append a 4-byte SHA-256d checksum to `payload` and Base58-encode it.
pub fn check_encode(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&sha256d(payload)[..4]);
    encode(&data)
}

/// Decode a Base58Check string and verify its checksum.
///
/// # Returns
/// The payload without the checksum, `ChecksumMismatch` if the trailing
/// four bytes do not match, or `InvalidBase58` for bad characters or
/// strings too short to carry a checksum.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut data = decode(s)?;
    if data.len() < 4 {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let split = data.len() - 4;
    if sha256d(&data[..split])[..4] != data[split..] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    data.truncate(split);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zeros_become_ones() {
        assert_eq!(encode(&[0, 0, 1]), "112");
        assert_eq!(decode("112").unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn test_check_roundtrip_address() {
        let mut payload = vec![0x00];
        payload.extend_from_slice(&hex::decode("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap());
        let addr = check_encode(&payload);
        assert_eq!(addr, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert_eq!(check_decode(&addr).unwrap(), payload);
    }

    #[test]
    fn test_check_decode_rejects_bad_checksum() {
        // Last character altered.
        let err = check_decode("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMJ").unwrap_err();
        assert!(matches!(err, PrimitivesError::ChecksumMismatch));
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert!(matches!(decode("0OIl"), Err(PrimitivesError::InvalidBase58(_))));
        assert!(matches!(check_decode("11"), Err(PrimitivesError::InvalidBase58(_))));
    }
}
