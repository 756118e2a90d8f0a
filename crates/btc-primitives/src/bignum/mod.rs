//! Arbitrary-precision integers with explicit-modulus arithmetic.
//!
//! `BigNumber` is the general-purpose integer used for protocol math whose
//! modulus is chosen by the caller. Key material lives in
//! [`CurveScalar`](crate::ec::CurveScalar) instead, which is fixed to the
//! group order and constant-time.

use std::fmt;

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::ec::CurveScalar;
use crate::PrimitivesError;

/// secp256k1 group order n, big-endian.
pub const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
    0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Signed arbitrary-precision integer.
///
/// All operations are pure: they borrow their operands and return a new value.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BigNumber(BigInt);

impl BigNumber {
    pub fn zero() -> Self {
        BigNumber(BigInt::zero())
    }

    pub fn one() -> Self {
        BigNumber(BigInt::one())
    }

    /// The secp256k1 group order n.
    pub fn curve_order() -> Self {
        Self::from_bytes_be(&CURVE_ORDER)
    }

    /// Interpret `bytes` as an unsigned big-endian integer.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        BigNumber(BigInt::from_bytes_be(Sign::Plus, bytes))
    }

    /// Parse a string in `radix` (2..=36). A `0x` prefix is accepted for
    /// base 16 and `0b` for base 2; a leading `-` makes the value negative.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, PrimitivesError> {
        if !(2..=36).contains(&radix) {
            return Err(PrimitivesError::Arithmetic(format!("unsupported radix {radix}")));
        }
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let digits = match radix {
            16 => digits.strip_prefix("0x").unwrap_or(digits),
            2 => digits.strip_prefix("0b").unwrap_or(digits),
            _ => digits,
        };
        if digits.starts_with(['+', '-']) {
            return Err(PrimitivesError::Arithmetic(format!("invalid base-{radix} number: {s:?}")));
        }
        let value = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(|| {
            PrimitivesError::Arithmetic(format!("invalid base-{radix} number: {s:?}"))
        })?;
        Ok(BigNumber(if negative { -value } else { value }))
    }

    pub fn from_hex(s: &str) -> Result<Self, PrimitivesError> {
        Self::from_str_radix(s, 16)
    }

    pub fn from_decimal(s: &str) -> Result<Self, PrimitivesError> {
        Self::from_str_radix(s, 10)
    }

    /// Render in `radix` (2..=36), lowercase, without prefix.
    pub fn to_str_radix(&self, radix: u32) -> String {
        self.0.to_str_radix(radix)
    }

    pub fn to_hex(&self) -> String {
        self.to_str_radix(16)
    }

    pub fn to_decimal(&self) -> String {
        self.to_str_radix(10)
    }

    /// Minimal unsigned big-endian magnitude. Zero encodes as an empty vector.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        if self.0.is_zero() {
            return Vec::new();
        }
        self.0.magnitude().to_bytes_be()
    }

    /// Left-padded 32-byte big-endian encoding.
    ///
    /// Fails for negative values and values wider than 256 bits.
    pub fn to_bytes32(&self) -> Result<[u8; 32], PrimitivesError> {
        if self.0.is_negative() {
            return Err(PrimitivesError::Arithmetic("negative value has no 32-byte form".into()));
        }
        let bytes = self.to_bytes_be();
        if bytes.len() > 32 {
            return Err(PrimitivesError::Arithmetic("value exceeds 256 bits".into()));
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(out)
    }

    /// Convert to a curve scalar. The value must already lie in `[0, n)`.
    pub fn to_scalar(&self) -> Result<CurveScalar, PrimitivesError> {
        let bytes = self.to_bytes32()?;
        CurveScalar::from_bytes(&bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn add(&self, other: &Self) -> Self {
        BigNumber(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Self) -> Self {
        BigNumber(&self.0 - &other.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        BigNumber(&self.0 * &other.0)
    }

    /// Truncating division with remainder.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), PrimitivesError> {
        if divisor.0.is_zero() {
            return Err(PrimitivesError::Arithmetic("division by zero".into()));
        }
        let (q, r) = self.0.div_rem(&divisor.0);
        Ok((BigNumber(q), BigNumber(r)))
    }

    /// `self mod m`, always in `[0, m)`.
    pub fn modulo(&self, m: &Self) -> Result<Self, PrimitivesError> {
        check_modulus(m)?;
        Ok(BigNumber(self.0.mod_floor(&m.0)))
    }

    pub fn add_mod(&self, other: &Self, m: &Self) -> Result<Self, PrimitivesError> {
        self.add(other).modulo(m)
    }

    pub fn sub_mod(&self, other: &Self, m: &Self) -> Result<Self, PrimitivesError> {
        self.sub(other).modulo(m)
    }

    pub fn mul_mod(&self, other: &Self, m: &Self) -> Result<Self, PrimitivesError> {
        self.mul(other).modulo(m)
    }

    /// Multiplicative inverse modulo `m`.
    ///
    /// Fails with `Arithmetic` when `gcd(self, m) != 1`, which includes zero.
    pub fn inverse_mod(&self, m: &Self) -> Result<Self, PrimitivesError> {
        let a = self.modulo(m)?;
        let egcd = a.0.extended_gcd(&m.0);
        if !egcd.gcd.is_one() {
            return Err(PrimitivesError::Arithmetic(format!(
                "{} has no inverse modulo {}",
                self.to_hex(),
                m.to_hex()
            )));
        }
        BigNumber(egcd.x).modulo(m)
    }

    /// `self * other^-1 mod m`.
    pub fn div_mod(&self, other: &Self, m: &Self) -> Result<Self, PrimitivesError> {
        self.mul_mod(&other.inverse_mod(m)?, m)
    }
}

fn check_modulus(m: &BigNumber) -> Result<(), PrimitivesError> {
    if !m.0.is_positive() {
        return Err(PrimitivesError::Arithmetic(format!(
            "modulus must be positive, got {}",
            m.to_decimal()
        )));
    }
    Ok(())
}

impl From<u32> for BigNumber {
    fn from(v: u32) -> Self {
        BigNumber(BigInt::from(v))
    }
}

impl From<u64> for BigNumber {
    fn from(v: u64) -> Self {
        BigNumber(BigInt::from(v))
    }
}

impl From<i32> for BigNumber {
    fn from(v: i32) -> Self {
        BigNumber(BigInt::from(v))
    }
}

impl From<i64> for BigNumber {
    fn from(v: i64) -> Self {
        BigNumber(BigInt::from(v))
    }
}

impl From<&CurveScalar> for BigNumber {
    fn from(s: &CurveScalar) -> Self {
        BigNumber::from_bytes_be(&*s.to_bytes())
    }
}

impl fmt::Debug for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigNumber(0x{})", self.to_hex())
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrips() {
        let n = BigNumber::from(0xdeadf00du32);
        assert_eq!(n.to_hex(), "deadf00d");
        let n = BigNumber::from(0xdeadf00ddeadf00du64);
        assert_eq!(n.to_hex(), "deadf00ddeadf00d");
        assert_eq!(BigNumber::from_hex("0xdeadf00ddeadf00d").unwrap(), n);

        let b = BigNumber::from_str_radix("1010111", 2).unwrap();
        assert_eq!(b.to_decimal(), "87");
        assert_eq!(b.to_str_radix(2), "1010111");

        assert_eq!(BigNumber::from_decimal("-42").unwrap(), BigNumber::from(-42i32));
        assert!(BigNumber::from_decimal("12a").is_err());
        assert!(BigNumber::from_str_radix("1", 37).is_err());
    }

    #[test]
    fn test_rejects_repeated_sign() {
        for bad in ["--5", "-+5", "+5", "-", "0x-ff"] {
            assert!(
                matches!(BigNumber::from_hex(bad), Err(PrimitivesError::Arithmetic(_))),
                "{bad:?} should not parse"
            );
        }
        assert_eq!(BigNumber::from_hex("-0xff").unwrap(), BigNumber::from(-255i32));
    }

    #[test]
    fn test_modular_ops() {
        let m = BigNumber::from(17u32);
        let a = BigNumber::from(15u32);
        let b = BigNumber::from(5u32);
        assert_eq!(a.add_mod(&b, &m).unwrap(), BigNumber::from(3u32));
        assert_eq!(b.sub_mod(&a, &m).unwrap(), BigNumber::from(7u32));
        assert_eq!(a.mul_mod(&b, &m).unwrap(), BigNumber::from(7u32));
        // 5^-1 mod 17 = 7 since 35 = 2*17 + 1
        assert_eq!(b.inverse_mod(&m).unwrap(), BigNumber::from(7u32));
        assert_eq!(a.div_mod(&b, &m).unwrap(), BigNumber::from(3u32));
        assert_eq!(BigNumber::from(-1i32).modulo(&m).unwrap(), BigNumber::from(16u32));
    }

    #[test]
    fn test_arithmetic_errors() {
        let a = BigNumber::from(4u32);
        assert!(matches!(a.modulo(&BigNumber::zero()), Err(PrimitivesError::Arithmetic(_))));
        assert!(matches!(a.modulo(&BigNumber::from(-3i32)), Err(PrimitivesError::Arithmetic(_))));
        assert!(matches!(
            BigNumber::zero().inverse_mod(&BigNumber::from(7u32)),
            Err(PrimitivesError::Arithmetic(_))
        ));
        assert!(matches!(
            a.inverse_mod(&BigNumber::from(8u32)),
            Err(PrimitivesError::Arithmetic(_))
        ));
        assert!(matches!(a.div_rem(&BigNumber::zero()), Err(PrimitivesError::Arithmetic(_))));
    }

    #[test]
    fn test_curve_order_and_bytes32() {
        let n = BigNumber::curve_order();
        assert_eq!(
            n.to_hex(),
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        );
        assert_eq!(n.to_bytes32().unwrap(), CURVE_ORDER);
        assert_eq!(BigNumber::from(1u32).to_bytes32().unwrap()[31], 1);
        assert!(n.add(&n).to_bytes32().is_err());
        let wide = BigNumber::from_bytes_be(&[1u8; 33]);
        assert!(wide.to_bytes32().is_err());
        assert!(BigNumber::from(-1i32).to_bytes32().is_err());
        // n itself is not a valid scalar, n - 1 is.
        assert!(n.to_scalar().is_err());
        assert!(n.sub(&BigNumber::one()).to_scalar().is_ok());
    }
}
