//! Consensus-canonical encoding checks for public keys and signatures.
//!
//! These only inspect byte shape. A key that passes may still be off the
//! curve, and a signature that passes may still fail verification.

use crate::ec::signature::HALF_ORDER;

/// Why an encoding is not canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CanonicalError {
    #[error("public key has wrong length {0}")]
    PublicKeyLength(usize),
    #[error("public key has unknown prefix {0:#04x}")]
    PublicKeyPrefix(u8),
    #[error("signature too short ({0} bytes)")]
    SignatureTooShort(usize),
    #[error("signature too long ({0} bytes)")]
    SignatureTooLong(usize),
    #[error("undefined hash type {0:#04x}")]
    UndefinedHashType(u8),
    #[error("wrong sequence tag")]
    WrongSequenceTag,
    #[error("sequence length does not match signature size")]
    WrongSequenceLength,
    #[error("S length is misplaced")]
    SLengthMisplaced,
    #[error("R and S lengths do not add up to the signature size")]
    LengthMismatch,
    #[error("R is not an integer")]
    RNotInteger,
    #[error("R has zero length")]
    ZeroLengthR,
    #[error("R is negative")]
    NegativeR,
    #[error("R has excess padding")]
    PaddedR,
    #[error("S is not an integer")]
    SNotInteger,
    #[error("S has zero length")]
    ZeroLengthS,
    #[error("S is negative")]
    NegativeS,
    #[error("S has excess padding")]
    PaddedS,
    #[error("S is above half the group order")]
    HighS,
}

const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Check that `bytes` is a 33-byte compressed or 65-byte uncompressed key encoding.
pub fn check_canonical_public_key(bytes: &[u8]) -> Result<(), CanonicalError> {
    if bytes.len() < 33 {
        return Err(CanonicalError::PublicKeyLength(bytes.len()));
    }
    match bytes[0] {
        0x04 if bytes.len() != 65 => Err(CanonicalError::PublicKeyLength(bytes.len())),
        0x02 | 0x03 if bytes.len() != 33 => Err(CanonicalError::PublicKeyLength(bytes.len())),
        0x02..=0x04 => Ok(()),
        prefix => Err(CanonicalError::PublicKeyPrefix(prefix)),
    }
}

pub fn is_canonical_public_key(bytes: &[u8]) -> bool {
    check_canonical_public_key(bytes).is_ok()
}

/// Check a strict-DER signature followed by one hash-type byte.
///
/// Layout: `0x30 [total-len] 0x02 [R-len] [R] 0x02 [S-len] [S] [hashtype]`.
/// When `require_low_s` is set, `S` must also be at most n/2.
pub fn check_canonical_signature(sig: &[u8], require_low_s: bool) -> Result<(), CanonicalError> {
    let size = sig.len();
    if size < 9 {
        return Err(CanonicalError::SignatureTooShort(size));
    }
    if size > 73 {
        return Err(CanonicalError::SignatureTooLong(size));
    }

    let hash_type = sig[size - 1] & !SIGHASH_ANYONECANPAY;
    if !(1..=3).contains(&hash_type) {
        return Err(CanonicalError::UndefinedHashType(sig[size - 1]));
    }

    if sig[0] != 0x30 {
        return Err(CanonicalError::WrongSequenceTag);
    }
    if sig[1] as usize != size - 3 {
        return Err(CanonicalError::WrongSequenceLength);
    }
    let len_r = sig[3] as usize;
    if 5 + len_r >= size {
        return Err(CanonicalError::SLengthMisplaced);
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != size {
        return Err(CanonicalError::LengthMismatch);
    }

    let r = &sig[4..4 + len_r];
    if sig[2] != 0x02 {
        return Err(CanonicalError::RNotInteger);
    }
    check_integer(r, CanonicalError::ZeroLengthR, CanonicalError::NegativeR, CanonicalError::PaddedR)?;

    let s = &sig[6 + len_r..6 + len_r + len_s];
    if sig[4 + len_r] != 0x02 {
        return Err(CanonicalError::SNotInteger);
    }
    check_integer(s, CanonicalError::ZeroLengthS, CanonicalError::NegativeS, CanonicalError::PaddedS)?;

    if require_low_s && !is_low(s) {
        return Err(CanonicalError::HighS);
    }
    Ok(())
}

pub fn is_canonical_signature(sig: &[u8], require_low_s: bool) -> bool {
    check_canonical_signature(sig, require_low_s).is_ok()
}

fn check_integer(
    v: &[u8],
    zero: CanonicalError,
    negative: CanonicalError,
    padded: CanonicalError,
) -> Result<(), CanonicalError> {
    match v {
        [] => Err(zero),
        [first, ..] if first & 0x80 != 0 => Err(negative),
        [0x00, second, ..] if second & 0x80 == 0 => Err(padded),
        _ => Ok(()),
    }
}

/// `v` is a non-negative minimal big-endian integer.
fn is_low(v: &[u8]) -> bool {
    let start = v.iter().position(|&b| b != 0).unwrap_or(v.len());
    let trimmed = &v[start..];
    if trimmed.len() > 32 {
        return false;
    }
    let mut padded = [0u8; 32];
    padded[32 - trimmed.len()..].copy_from_slice(trimmed);
    padded <= HALF_ORDER
}
