use std::fmt;

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::ff::PrimeField;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::scalar::IsHigh;
use k256::{FieldBytes, NonZeroScalar, Scalar, U256};
use rand::rngs::OsRng;
use zeroize::{Zeroize, Zeroizing};

use crate::PrimitivesError;

/// An integer modulo the secp256k1 group order n.
///
/// Arithmetic is constant-time (it delegates to `k256`), so this is the
/// type used for secrets and derivation tweaks. The value is wiped when
/// dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct CurveScalar(pub(crate) Scalar);

impl CurveScalar {
    pub const ZERO: CurveScalar = CurveScalar(Scalar::ZERO);
    pub const ONE: CurveScalar = CurveScalar(Scalar::ONE);

    /// Parse a 32-byte big-endian value in `[0, n)`.
    ///
    /// Values `>= n` are rejected with `InvalidKey` rather than reduced.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != 32 {
            return Err(PrimitivesError::InvalidKey(format!(
                "scalar must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        let repr = FieldBytes::from(arr);
        arr.zeroize();
        Option::<Scalar>::from(Scalar::from_repr(repr))
            .map(CurveScalar)
            .ok_or_else(|| PrimitivesError::InvalidKey("scalar is not below the group order".into()))
    }

    /// Interpret 32 big-endian bytes modulo n.
    pub fn from_bytes_reduced(bytes: &[u8; 32]) -> Self {
        let repr: FieldBytes = (*bytes).into();
        CurveScalar(<Scalar as Reduce<U256>>::reduce_bytes(&repr))
    }

    /// Uniformly random non-zero scalar from the OS RNG.
    pub fn random() -> Self {
        CurveScalar(*NonZeroScalar::random(&mut OsRng))
    }

    pub fn add(&self, other: &Self) -> Self {
        CurveScalar(self.0 + other.0)
    }

    pub fn sub(&self, other: &Self) -> Self {
        CurveScalar(self.0 - other.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        CurveScalar(self.0 * other.0)
    }

    pub fn negate(&self) -> Self {
        CurveScalar(-self.0)
    }

    /// Multiplicative inverse; zero has none.
    pub fn invert(&self) -> Result<Self, PrimitivesError> {
        Option::<Scalar>::from(self.0.invert())
            .map(CurveScalar)
            .ok_or_else(|| PrimitivesError::Arithmetic("zero has no inverse modulo n".into()))
    }

    /// `self * other^-1 mod n`.
    pub fn div(&self, other: &Self) -> Result<Self, PrimitivesError> {
        Ok(self.mul(&other.invert()?))
    }

    pub fn is_zero(&self) -> bool {
        bool::from(self.0.is_zero())
    }

    /// True when the value is greater than n/2.
    pub fn is_high(&self) -> bool {
        bool::from(self.0.is_high())
    }

    /// Big-endian bytes, wiped when the returned buffer is dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    pub(crate) fn signing_key(&self) -> Result<SigningKey, PrimitivesError> {
        Option::<NonZeroScalar>::from(NonZeroScalar::new(self.0))
            .map(SigningKey::from)
            .ok_or_else(|| PrimitivesError::InvalidKey("zero scalar cannot sign".into()))
    }
}

impl Zeroize for CurveScalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for CurveScalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for CurveScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CurveScalar(..)")
    }
}
