//! Hash collaborators.
//!
//! Opaque byte-to-byte digests consumed by key handling, BIP32 derivation
//! and signature hashing. Nothing here interprets the data it hashes.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute SHA-256(SHA-256(data)).
///
/// Used for transaction ids, Base58Check checksums and signature hashes.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the RIPEMD-160 digest of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Ripemd160::digest(data));
    out
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// # Arguments
/// * `data` - Usually a serialized public key.
///
/// # Returns
/// The 20-byte key hash used by P2PKH scripts, addresses and BIP32 fingerprints.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Compute HMAC-SHA512 of `data` keyed with `key`.
///
/// # Arguments
/// * `key` - HMAC key; any length is accepted.
/// * `data` - Message bytes.
///
/// # Returns
/// The 64-byte tag. BIP32 splits it into a 32-byte tweak and a chain code.
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = match Hmac::<Sha512>::new_from_slice(key) {
        Ok(mac) => mac,
        // HMAC pads or hashes keys of any length, so this arm is unreachable.
        Err(_) => unreachable!("HMAC-SHA512 accepts keys of any length"),
    };
    mac.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}
