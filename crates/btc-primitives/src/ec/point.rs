use std::fmt;

use k256::elliptic_curve::sec1::{EncodedPoint, FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, ProjectivePoint, Secp256k1};

use crate::bignum::BigNumber;
use crate::ec::CurveScalar;
use crate::PrimitivesError;

/// A point on secp256k1, or the point at infinity.
///
/// Every operation returns a new point. Scalar multiplication goes through
/// `k256`'s constant-time ladder, so multiplying by a secret does not leak
/// its bits through timing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CurvePoint(pub(crate) ProjectivePoint);

impl CurvePoint {
    /// The generator G.
    pub fn generator() -> Self {
        CurvePoint(ProjectivePoint::GENERATOR)
    }

    /// The point at infinity (group identity).
    pub fn infinity() -> Self {
        CurvePoint(ProjectivePoint::IDENTITY)
    }

    pub fn is_infinity(&self) -> bool {
        self.0 == ProjectivePoint::IDENTITY
    }

    /// Decode a 33-byte compressed or 65-byte uncompressed SEC1 point.
    ///
    /// Fails with `InvalidKey` for any other shape or for coordinates that
    /// are not on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        match (bytes.len(), bytes.first().copied()) {
            (33, Some(0x02 | 0x03)) | (65, Some(0x04)) => {}
            (len, _) => {
                return Err(PrimitivesError::InvalidKey(format!(
                    "malformed public key encoding ({len} bytes)"
                )))
            }
        }
        let encoded = EncodedPoint::<Secp256k1>::from_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidKey(e.to_string()))?;
        Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .map(|p| CurvePoint(p.into()))
            .ok_or_else(|| PrimitivesError::InvalidKey("point is not on the curve".into()))
    }

    /// 33-byte compressed encoding.
    pub fn to_compressed(&self) -> Result<[u8; 33], PrimitivesError> {
        let mut out = [0u8; 33];
        out.copy_from_slice(&self.encode(true)?);
        Ok(out)
    }

    /// 65-byte uncompressed encoding.
    pub fn to_uncompressed(&self) -> Result<[u8; 65], PrimitivesError> {
        let mut out = [0u8; 65];
        out.copy_from_slice(&self.encode(false)?);
        Ok(out)
    }

    /// SEC1 encoding in the requested form. Infinity has none.
    pub fn encode(&self, compressed: bool) -> Result<Vec<u8>, PrimitivesError> {
        if self.is_infinity() {
            return Err(PrimitivesError::InvalidKey("point at infinity has no encoding".into()));
        }
        Ok(self.0.to_affine().to_encoded_point(compressed).as_bytes().to_vec())
    }

    /// Affine x coordinate.
    pub fn x(&self) -> Result<BigNumber, PrimitivesError> {
        let uncompressed = self.to_uncompressed()?;
        Ok(BigNumber::from_bytes_be(&uncompressed[1..33]))
    }

    /// Affine y coordinate.
    pub fn y(&self) -> Result<BigNumber, PrimitivesError> {
        let uncompressed = self.to_uncompressed()?;
        Ok(BigNumber::from_bytes_be(&uncompressed[33..65]))
    }

    /// `k * self`.
    pub fn mul(&self, k: &CurveScalar) -> Self {
        CurvePoint(self.0 * k.0)
    }

    /// `k * self` for an arbitrary integer, reduced modulo n first.
    ///
    /// Intended for public values; secrets should go through [`CurvePoint::mul`].
    pub fn mul_number(&self, k: &BigNumber) -> Result<Self, PrimitivesError> {
        let reduced = k.modulo(&BigNumber::curve_order())?;
        Ok(self.mul(&reduced.to_scalar()?))
    }

    pub fn add(&self, other: &Self) -> Self {
        CurvePoint(self.0 + other.0)
    }

    /// `self + k * G`.
    pub fn add_generator_mul(&self, k: &CurveScalar) -> Self {
        CurvePoint(self.0 + ProjectivePoint::GENERATOR * k.0)
    }

    pub fn negate(&self) -> Self {
        CurvePoint(-self.0)
    }

    pub(crate) fn to_affine(&self) -> AffinePoint {
        self.0.to_affine()
    }
}

impl fmt::Debug for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode(true) {
            Ok(bytes) => write!(f, "CurvePoint({})", hex::encode(bytes)),
            Err(_) => f.write_str("CurvePoint(infinity)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const G_UNCOMPRESSED: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
                                  483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
    // 2G
    const G2_COMPRESSED: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

    fn scalar(v: u8) -> CurveScalar {
        let mut bytes = [0u8; 32];
        bytes[31] = v;
        CurveScalar::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_generator_encodings() {
        let g = CurvePoint::generator();
        assert_eq!(hex::encode(g.to_compressed().unwrap()), G_COMPRESSED);
        assert_eq!(hex::encode(g.to_uncompressed().unwrap()), G_UNCOMPRESSED);
        assert_eq!(
            g.x().unwrap().to_hex(),
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            g.y().unwrap().to_hex(),
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn test_compressed_and_uncompressed_decode_to_same_point() {
        let a = CurvePoint::from_bytes(&hex::decode(G_COMPRESSED).unwrap()).unwrap();
        let b = CurvePoint::from_bytes(&hex::decode(G_UNCOMPRESSED).unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, CurvePoint::generator());
    }

    #[test]
    fn test_from_bytes_rejects_bad_shapes() {
        let mut bytes = hex::decode(G_COMPRESSED).unwrap();
        bytes[0] = 0x04;
        assert!(CurvePoint::from_bytes(&bytes).is_err());
        assert!(CurvePoint::from_bytes(&bytes[..32]).is_err());
        assert!(CurvePoint::from_bytes(&[]).is_err());
        // x above the field prime is not a coordinate.
        let mut off_curve = [0xffu8; 33];
        off_curve[0] = 0x02;
        assert!(CurvePoint::from_bytes(&off_curve).is_err());
        // Uncompressed G with y flipped by one is off the curve.
        let mut bad_y = hex::decode(G_UNCOMPRESSED).unwrap();
        bad_y[64] ^= 1;
        assert!(CurvePoint::from_bytes(&bad_y).is_err());
    }

    #[test]
    fn test_add_and_mul_agree() {
        let g = CurvePoint::generator();
        let two_g = g.add(&g);
        assert_eq!(hex::encode(two_g.to_compressed().unwrap()), G2_COMPRESSED);
        assert_eq!(g.mul(&scalar(2)), two_g);
        assert_eq!(CurvePoint::infinity().add_generator_mul(&scalar(2)), two_g);
        assert_eq!(g.mul_number(&BigNumber::from(2u32)).unwrap(), two_g);
        // n + 2 reduces to 2.
        let n_plus_two = BigNumber::curve_order().add(&BigNumber::from(2u32));
        assert_eq!(g.mul_number(&n_plus_two).unwrap(), two_g);
    }

    #[test]
    fn test_infinity_propagates() {
        let g = CurvePoint::generator();
        let inf = g.add(&g.negate());
        assert!(inf.is_infinity());
        assert_eq!(inf.add(&g), g);
        assert_eq!(g.add(&inf), g);
        assert!(inf.mul(&scalar(9)).is_infinity());
        assert!(g.mul(&CurveScalar::ZERO).is_infinity());
        assert!(inf.to_compressed().is_err());
        assert!(inf.x().is_err());
        assert_eq!(format!("{inf:?}"), "CurvePoint(infinity)");
    }

    #[test]
    fn test_operations_do_not_mutate_operands() {
        let g = CurvePoint::generator();
        let before = g;
        let _ = g.add(&g);
        let _ = g.mul(&scalar(3));
        assert_eq!(g, before);
    }
}
