//! Key pairs: an optional secret scalar plus its public point.

use std::fmt;

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, RecoveryId, VerifyingKey};
use zeroize::Zeroizing;

use crate::base58;
use crate::ec::{CurvePoint, CurveScalar, Signature};
use crate::hash::hash160;
use crate::network::Network;
use crate::PrimitivesError;

/// Offset of the header byte of a compact signature.
const COMPACT_HEADER_BASE: u8 = 27;
/// Added to the compact header when the signer uses a compressed public key.
const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// A secp256k1 key pair.
///
/// When the secret `d` is present the public point is always `d·G`; there is
/// no way to set the point independently. Without a secret the pair can
/// only verify. The `compressed` flag picks which public-key encoding is
/// canonical for addresses and compact signatures.
///
/// The secret is wiped on `clear()` and on drop.
#[derive(Clone)]
pub struct KeyPair {
    secret: Option<CurveScalar>,
    public: CurvePoint,
    compressed: bool,
}

impl KeyPair {
    /// Fresh key with a random secret in `[1, n-1]`.
    pub fn generate() -> Self {
        let secret = CurveScalar::random();
        let public = CurvePoint::generator().mul(&secret);
        KeyPair { secret: Some(secret), public, compressed: true }
    }

    /// Key from a 32-byte big-endian secret.
    ///
    /// # Returns
    /// `InvalidKey` if the secret is zero, at least n, or not 32 bytes.
    pub fn from_secret(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        Self::from_scalar(CurveScalar::from_bytes(bytes)?)
    }

    pub(crate) fn from_scalar(secret: CurveScalar) -> Result<Self, PrimitivesError> {
        if secret.is_zero() {
            return Err(PrimitivesError::InvalidKey("secret is zero".into()));
        }
        let public = CurvePoint::generator().mul(&secret);
        Ok(KeyPair { secret: Some(secret), public, compressed: true })
    }

    /// Verification-only key. The point at infinity is not a key.
    pub fn from_public_point(point: CurvePoint) -> Result<Self, PrimitivesError> {
        if point.is_infinity() {
            return Err(PrimitivesError::InvalidKey("public point is at infinity".into()));
        }
        Ok(KeyPair { secret: None, public: point, compressed: true })
    }

    /// Verification-only key from a SEC1 encoding; the compression flag
    /// follows the encoding length.
    pub fn from_public_key_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let point = CurvePoint::from_bytes(bytes)?;
        Ok(KeyPair { secret: None, public: point, compressed: bytes.len() == 33 })
    }

    /// Copy of this key without the secret.
    pub fn public_only(&self) -> KeyPair {
        KeyPair { secret: None, public: self.public, compressed: self.compressed }
    }

    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn public_point(&self) -> &CurvePoint {
        &self.public
    }

    pub(crate) fn secret_scalar(&self) -> Option<&CurveScalar> {
        self.secret.as_ref()
    }

    /// The secret as 32 big-endian bytes, wiped when dropped.
    pub fn secret_bytes(&self) -> Option<Zeroizing<[u8; 32]>> {
        self.secret.as_ref().map(CurveScalar::to_bytes)
    }

    fn require_secret(&self) -> Result<&CurveScalar, PrimitivesError> {
        self.secret.as_ref().ok_or(PrimitivesError::NoSecretKey)
    }

    /// Public key in the encoding selected by the compression flag.
    pub fn public_key(&self) -> Vec<u8> {
        self.encode_public(self.compressed)
    }

    pub fn compressed_public_key(&self) -> Vec<u8> {
        self.encode_public(true)
    }

    pub fn uncompressed_public_key(&self) -> Vec<u8> {
        self.encode_public(false)
    }

    fn encode_public(&self, compressed: bool) -> Vec<u8> {
        // Constructors reject infinity, so encoding cannot fail here.
        self.public.encode(compressed).unwrap_or_default()
    }

    /// Hash160 of [`KeyPair::public_key`].
    pub fn public_key_hash(&self) -> [u8; 20] {
        hash160(&self.public_key())
    }

    pub fn compressed_public_key_hash(&self) -> [u8; 20] {
        hash160(&self.compressed_public_key())
    }

    pub fn uncompressed_public_key_hash(&self) -> [u8; 20] {
        hash160(&self.uncompressed_public_key())
    }

    /// P2PKH address for [`KeyPair::public_key_hash`].
    pub fn address(&self, network: Network) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(network.p2pkh_prefix());
        payload.extend_from_slice(&self.public_key_hash());
        base58::check_encode(&payload)
    }

    /// Deterministic (RFC6979) ECDSA signature with `s <= n/2`.
    pub fn sign(&self, hash: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Ok(self.sign_recoverable(hash)?.0)
    }

    /// DER signature with a trailing hash-type byte, ready for a scriptSig.
    pub fn sign_with_hash_type(&self, hash: &[u8; 32], hash_type: u8) -> Result<Vec<u8>, PrimitivesError> {
        Ok(self.sign(hash)?.to_der_with_hash_type(hash_type))
    }

    fn sign_recoverable(&self, hash: &[u8; 32]) -> Result<(Signature, RecoveryId), PrimitivesError> {
        let signing_key = self.require_secret()?.signing_key()?;
        let (sig, recid) = signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let (sig, recid) = low_s_with_recovery_id(sig, recid);
        Ok((Signature::from_k256(&sig), recid))
    }

    /// ECDSA verification against the public point.
    ///
    /// High-S signatures are accepted; low-S is a signing policy, enforced
    /// separately by [`canonical`](crate::ec::canonical).
    pub fn verify(&self, signature: &Signature, hash: &[u8; 32]) -> bool {
        let Ok(sig) = signature.normalize_s().to_k256() else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_affine(self.public.to_affine()) else {
            return false;
        };
        key.verify_prehash(hash, &sig).is_ok()
    }

    /// Verify a DER-encoded signature (no hash-type byte).
    pub fn verify_der(&self, der: &[u8], hash: &[u8; 32]) -> bool {
        Signature::from_der(der).is_ok_and(|sig| self.verify(&sig, hash))
    }

    /// 65-byte recoverable signature: `[header | r | s]` where the header is
    /// `27 + recovery id`, plus 4 if the key is compressed.
    pub fn sign_compact(&self, hash: &[u8; 32]) -> Result<[u8; 65], PrimitivesError> {
        let (sig, recid) = self.sign_recoverable(hash)?;
        let mut out = [0u8; 65];
        out[0] = COMPACT_HEADER_BASE
            + recid.to_byte()
            + if self.compressed { COMPACT_COMPRESSED_FLAG } else { 0 };
        out[1..33].copy_from_slice(sig.r());
        out[33..].copy_from_slice(sig.s());
        Ok(out)
    }

    /// Recover the signer of a compact signature.
    ///
    /// The returned key is verification-only; its compression flag comes
    /// from the signature header.
    pub fn recover_compact(signature: &[u8], hash: &[u8; 32]) -> Result<KeyPair, PrimitivesError> {
        if signature.len() != 65 {
            return Err(PrimitivesError::InvalidSignature(format!(
                "compact signature must be 65 bytes, got {}",
                signature.len()
            )));
        }
        let header = signature[0]
            .checked_sub(COMPACT_HEADER_BASE)
            .filter(|h| *h < 8)
            .ok_or_else(|| {
                PrimitivesError::InvalidSignature(format!("bad compact header {:#04x}", signature[0]))
            })?;
        let recid = RecoveryId::from_byte(header & 3)
            .ok_or_else(|| PrimitivesError::InvalidSignature("bad recovery id".into()))?;
        let compressed = header & COMPACT_COMPRESSED_FLAG != 0;

        let sig = ecdsa::Signature::from_slice(&signature[1..])
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let (sig, recid) = low_s_with_recovery_id(sig, recid);
        let key = VerifyingKey::recover_from_prehash(hash, &sig, recid)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let point = CurvePoint((*key.as_affine()).into());
        Ok(KeyPair::from_public_point(point)?.with_compressed(compressed))
    }

    /// Whether `signature` is a compact signature of `hash` by this key.
    pub fn is_valid_compact_signature(&self, signature: &[u8], hash: &[u8; 32]) -> bool {
        KeyPair::recover_compact(signature, hash).is_ok_and(|k| k.public == self.public)
    }

    /// Wipe the secret. Signing fails with `NoSecretKey` afterwards.
    pub fn clear(&mut self) {
        // CurveScalar zeroizes on drop.
        self.secret = None;
    }

    /// Shared point `d·Q` between this secret and another key's public point.
    pub fn diffie_hellman(&self, other: &KeyPair) -> Result<KeyPair, PrimitivesError> {
        let secret = self.require_secret()?;
        KeyPair::from_public_point(other.public.mul(secret))
    }

    /// Wallet Import Format: Base58Check of `prefix || secret [|| 0x01]`.
    pub fn to_wif(&self, network: Network) -> Result<String, PrimitivesError> {
        let secret = self.require_secret()?.to_bytes();
        let mut payload = Zeroizing::new(Vec::with_capacity(34));
        payload.push(network.wif_prefix());
        payload.extend_from_slice(&*secret);
        if self.compressed {
            payload.push(0x01);
        }
        Ok(base58::check_encode(&payload))
    }

    /// Parse a WIF secret for either network.
    pub fn from_wif(wif: &str) -> Result<(KeyPair, Network), PrimitivesError> {
        let payload = Zeroizing::new(base58::check_decode(wif)?);
        let network = payload
            .first()
            .and_then(|p| Network::from_wif_prefix(*p))
            .ok_or_else(|| PrimitivesError::InvalidWif("unknown prefix".into()))?;
        let compressed = match payload.len() {
            33 => false,
            34 if payload[33] == 0x01 => true,
            len => return Err(PrimitivesError::InvalidWif(format!("unexpected length {len}"))),
        };
        let key = KeyPair::from_secret(&payload[1..33])?.with_compressed(compressed);
        Ok((key, network))
    }
}

/// Flipping `s` to `n - s` negates R, which toggles the y-parity bit of the recovery id.
fn low_s_with_recovery_id(sig: ecdsa::Signature, recid: RecoveryId) -> (ecdsa::Signature, RecoveryId) {
    match sig.normalize_s() {
        Some(low) => (low, RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced())),
        None => (sig, recid),
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public && self.compressed == other.compressed && self.secret == other.secret
    }
}

impl Eq for KeyPair {}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(self.public_key()))
            .field("has_secret", &self.has_secret())
            .field("compressed", &self.compressed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::canonical::is_canonical_signature;
    use crate::hash::{sha256, sha256d};

    const KEY: &str = "c4bbcb1fbec99d65bf59d85c8cb62ee2db963f0fe106f483d9afa73bd4e39a8a";

    fn key(hex_secret: &str) -> KeyPair {
        KeyPair::from_secret(&hex::decode(hex_secret).unwrap()).unwrap()
    }

    #[test]
    fn test_from_secret_roundtrip() {
        let k = key(KEY);
        assert_eq!(hex::encode(&*k.secret_bytes().unwrap()), KEY);
        let expected = CurvePoint::generator().mul(&CurveScalar::from_bytes(&hex::decode(KEY).unwrap()).unwrap());
        assert_eq!(k.public_point(), &expected);
    }

    #[test]
    fn test_from_secret_rejects_out_of_range() {
        assert!(matches!(KeyPair::from_secret(&[0u8; 32]), Err(PrimitivesError::InvalidKey(_))));
        assert!(matches!(
            KeyPair::from_secret(&crate::bignum::CURVE_ORDER),
            Err(PrimitivesError::InvalidKey(_))
        ));
        assert!(matches!(KeyPair::from_secret(&[1u8; 33]), Err(PrimitivesError::InvalidKey(_))));
    }

    #[test]
    fn test_address_and_wif() {
        let k = key(KEY).with_compressed(false);
        assert_eq!(k.address(Network::Mainnet), "1JwSSubhmg6iPtRjtyqhUYYH7bZg3Lfy1T");
        let wif = k.to_wif(Network::Mainnet).unwrap();
        assert_eq!(wif, "5KJvsngHeMpm884wtkJNzQGaCErckhHJBGFsvd3VyK5qMZXj3hS");

        let (parsed, network) = KeyPair::from_wif(&wif).unwrap();
        assert_eq!(network, Network::Mainnet);
        assert_eq!(parsed, k);

        let compressed = k.clone().with_compressed(true);
        let (parsed, _) = KeyPair::from_wif(&compressed.to_wif(Network::Testnet).unwrap()).unwrap();
        assert!(parsed.is_compressed());
        assert_eq!(parsed.public_point(), k.public_point());
    }

    #[test]
    fn test_public_encodings() {
        let k = key(KEY);
        let c = k.compressed_public_key();
        let u = k.uncompressed_public_key();
        assert_eq!(c.len(), 33);
        assert_eq!(u.len(), 65);
        assert_eq!(k.public_key(), c);
        let from_c = KeyPair::from_public_key_bytes(&c).unwrap();
        let from_u = KeyPair::from_public_key_bytes(&u).unwrap();
        assert_eq!(from_c.public_point(), from_u.public_point());
        assert!(from_c.is_compressed());
        assert!(!from_u.is_compressed());
        assert_eq!(from_u.public_key_hash(), k.uncompressed_public_key_hash());
    }

    /// RFC6979 vectors (sha256 of the message as the digest).
    #[test]
    fn test_rfc6979() {
        let tests = [
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
                "Satoshi Nakamoto",
                "3045022100fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d002206b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "All those moments will be lost in time, like tears in rain. Time to die...",
                "30450221008600dbd41e348fe5c9465ab92d23e3db8b98b873beecd930736488696438cb6b0220547fe64427496db33bf66019dacbf0039c04199abb0122918601db38a72cfc21",
            ),
        ];
        for (secret, msg, expected) in tests {
            let k = key(secret);
            let hash = sha256(msg.as_bytes());
            let sig = k.sign(&hash).unwrap();
            assert_eq!(hex::encode(sig.to_der()), expected, "message {msg:?}");
            assert!(sig.is_low_s());
            assert!(k.verify(&sig, &hash));
            // Re-signing is reproducible.
            assert_eq!(k.sign(&hash).unwrap(), sig);
        }
    }

    #[test]
    fn test_sign_verify_and_canonical() {
        let k = KeyPair::generate();
        let hash = sha256d(b"sign me");
        let signed = k.sign_with_hash_type(&hash, 0x01).unwrap();
        assert!(is_canonical_signature(&signed, true));
        assert!(k.verify_der(&signed[..signed.len() - 1], &hash));
        assert!(!k.verify_der(&signed[..signed.len() - 1], &sha256d(b"other")));
        assert!(!KeyPair::generate().verify_der(&signed[..signed.len() - 1], &hash));
    }

    #[test]
    fn test_verify_accepts_high_s() {
        let k = key(KEY);
        let hash = sha256d(b"malleable");
        let sig = k.sign(&hash).unwrap();
        let flipped = crate::bignum::BigNumber::curve_order()
            .sub(&crate::bignum::BigNumber::from_bytes_be(sig.s()))
            .to_bytes32()
            .unwrap();
        let high = Signature::new(*sig.r(), flipped);
        assert!(!high.is_low_s());
        assert!(k.verify(&high, &hash));
    }

    #[test]
    fn test_compact_roundtrip() {
        for compressed in [true, false] {
            let k = KeyPair::generate().with_compressed(compressed);
            let hash = sha256d(b"compact");
            let sig = k.sign_compact(&hash).unwrap();
            let base = if compressed { 31 } else { 27 };
            assert!((base..base + 4).contains(&sig[0]));

            let recovered = KeyPair::recover_compact(&sig, &hash).unwrap();
            assert_eq!(recovered.public_point(), k.public_point());
            assert_eq!(recovered.is_compressed(), compressed);
            assert!(!recovered.has_secret());
            assert!(k.is_valid_compact_signature(&sig, &hash));
        }
    }

    #[test]
    fn test_recover_compact_rejects_malformed() {
        let hash = sha256d(b"x");
        assert!(matches!(
            KeyPair::recover_compact(&[0u8; 64], &hash),
            Err(PrimitivesError::InvalidSignature(_))
        ));
        let mut sig = KeyPair::generate().sign_compact(&hash).unwrap();
        sig[0] = 26;
        assert!(matches!(KeyPair::recover_compact(&sig, &hash), Err(PrimitivesError::InvalidSignature(_))));
        sig[0] = 31;
        sig[1..33].copy_from_slice(&[0u8; 32]);
        assert!(matches!(KeyPair::recover_compact(&sig, &hash), Err(PrimitivesError::InvalidSignature(_))));
    }

    #[test]
    fn test_public_only_and_clear() {
        let mut k = key(KEY);
        let hash = sha256d(b"clear");
        let public = KeyPair::from_public_point(*k.public_point()).unwrap();
        assert!(matches!(public.sign(&hash), Err(PrimitivesError::NoSecretKey)));
        assert!(public.verify(&k.sign(&hash).unwrap(), &hash));

        k.clear();
        assert!(!k.has_secret());
        assert!(k.secret_bytes().is_none());
        assert!(matches!(k.sign(&hash), Err(PrimitivesError::NoSecretKey)));
        assert!(matches!(k.sign_compact(&hash), Err(PrimitivesError::NoSecretKey)));
        assert!(matches!(k.to_wif(Network::Mainnet), Err(PrimitivesError::NoSecretKey)));

        assert!(KeyPair::from_public_point(CurvePoint::infinity()).is_err());
    }

    #[test]
    fn test_diffie_hellman() {
        let alice = key(KEY);
        let bob = key("2db963f0fe106f483d9afa73bd4e39a8ac4bbcb1fbec99d65bf59d85c8cb62ee");
        let ab = alice.diffie_hellman(&bob).unwrap();
        let ba = bob.diffie_hellman(&alice).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(
            hex::encode(ab.compressed_public_key()),
            "03735932754bc16e10febe40ee0280906d29459d477442f1838dcf27de3b5d9699"
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", key(KEY));
        assert!(!rendered.contains(KEY));
        assert!(rendered.contains("has_secret: true"));
    }
}
