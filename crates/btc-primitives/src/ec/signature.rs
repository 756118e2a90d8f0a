//! ECDSA signature values and their DER encoding.

use k256::ecdsa;

use crate::bignum::CURVE_ORDER;
use crate::PrimitivesError;

/// n / 2, the largest `s` a low-S signature may carry.
pub const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d,
    0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// An ECDSA `(r, s)` pair, each stored as 32 big-endian bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parse a DER `SEQUENCE { INTEGER r, INTEGER s }`.
    ///
    /// Parsing is lenient about integer padding (strictness is the job of
    /// [`canonical`](crate::ec::canonical)) but rejects trailing bytes and
    /// values of zero or at least n.
    ///
    /// # Arguments
    /// * `bytes` - DER bytes without a trailing hash-type byte.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let malformed = |what: &str| PrimitivesError::InvalidSignature(format!("malformed DER: {what}"));

        if bytes.len() < 8 {
            return Err(malformed("too short"));
        }
        if bytes[0] != 0x30 {
            return Err(malformed("missing sequence tag"));
        }
        if bytes[1] as usize + 2 != bytes.len() {
            return Err(malformed("sequence length does not match"));
        }

        let (r, rest) = read_der_integer(&bytes[2..]).ok_or_else(|| malformed("bad R integer"))?;
        let (s, rest) = read_der_integer(rest).ok_or_else(|| malformed("bad S integer"))?;
        if !rest.is_empty() {
            return Err(malformed("trailing bytes"));
        }

        let r = to_32_bytes(r)?;
        let s = to_32_bytes(s)?;
        for (name, v) in [("R", &r), ("S", &s)] {
            if v.iter().all(|&b| b == 0) {
                return Err(PrimitivesError::InvalidSignature(format!("signature {name} is zero")));
            }
            if *v >= CURVE_ORDER {
                return Err(PrimitivesError::InvalidSignature(format!("signature {name} is >= n")));
            }
        }
        Ok(Signature { r, s })
    }

    /// Minimal DER encoding of `(r, s)` exactly as stored.
    pub fn to_der(&self) -> Vec<u8> {
        let rb = der_integer_bytes(&self.r);
        let sb = der_integer_bytes(&self.s);
        let mut out = Vec::with_capacity(6 + rb.len() + sb.len());
        out.push(0x30);
        out.push((4 + rb.len() + sb.len()) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// DER encoding followed by one hash-type byte, as pushed in scriptSigs.
    pub fn to_der_with_hash_type(&self, hash_type: u8) -> Vec<u8> {
        let mut out = self.to_der();
        out.push(hash_type);
        out
    }

    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_ORDER
    }

    /// Same signature with `s` replaced by `n - s` if it was high.
    pub fn normalize_s(&self) -> Self {
        if self.is_low_s() {
            return self.clone();
        }
        Signature { r: self.r, s: subtract_from_order(&self.s) }
    }

    pub(crate) fn from_k256(sig: &ecdsa::Signature) -> Self {
        let (r, s) = sig.split_bytes();
        let mut out = Signature { r: [0u8; 32], s: [0u8; 32] };
        out.r.copy_from_slice(&r);
        out.s.copy_from_slice(&s);
        out
    }

    pub(crate) fn to_k256(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        ecdsa::Signature::from_scalars(k256::FieldBytes::from(self.r), k256::FieldBytes::from(self.s))
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }
}

/// Split one `0x02 <len> <bytes>` element off the front of `data`.
fn read_der_integer(data: &[u8]) -> Option<(&[u8], &[u8])> {
    match data {
        [0x02, len, rest @ ..] if *len > 0 && rest.len() >= *len as usize => {
            Some(rest.split_at(*len as usize))
        }
        _ => None,
    }
}

/// Strip sign padding and left-pad to 32 bytes.
fn to_32_bytes(bytes: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    if trimmed.len() > 32 {
        return Err(PrimitivesError::InvalidSignature("integer wider than 32 bytes".into()));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

/// Shortest big-endian form with a 0x00 prefix when the high bit is set.
fn der_integer_bytes(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = CURVE_ORDER[i] as i16 - val[i] as i16 - borrow;
        borrow = 0;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        }
        result[i] = diff as u8;
    }
    result
}
