//! BIP32 extended keys.
//!
//! A node is a [`KeyPair`] plus a chain code and its position in the tree.
//! Child derivation follows BIP32 exactly, including the rare invalid-child
//! case, which surfaces as [`PrimitivesError::InvalidChild`] so the caller can
//! move on to the next index.

use std::fmt;

use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::base58;
use crate::ec::{CurvePoint, CurveScalar, KeyPair};
use crate::hash::{hash160, sha512_hmac};
use crate::hd::path::{ChildNumber, DerivationPath};
use crate::network::Network;
use crate::PrimitivesError;

/// High bit of a wire-format child index, set for hardened children.
pub const HARDENED_BIT: u32 = 0x8000_0000;
/// Largest raw child index.
pub const MAX_INDEX: u32 = 0x7fff_ffff;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
const EXTENDED_KEY_LEN: usize = 78;

/// A BIP32 node.
///
/// `is_private()` is derived from whether the key pair holds a secret and
/// the fingerprint is recomputed from the public key, so neither can drift
/// out of sync with the key. After [`HdKeychain::clear`] the chain code is
/// gone, so derivation and serialization fail with `KeychainCleared`.
#[derive(Clone)]
pub struct HdKeychain {
    key: KeyPair,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: u32,
    index: u32,
    hardened: bool,
    network: Network,
    cleared: bool,
}

/// What [`HdKeychain::find_child`] looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    PublicKey(CurvePoint),
    /// Hash160 of either the compressed or the uncompressed public key.
    KeyHash([u8; 20]),
}

impl ScanTarget {
    /// Target the key hash inside a P2PKH address.
    pub fn from_address(address: &str) -> Result<Self, PrimitivesError> {
        let payload = base58::check_decode(address)?;
        if payload.len() != 21 {
            return Err(PrimitivesError::InvalidBase58(format!(
                "address payload must be 21 bytes, got {}",
                payload.len()
            )));
        }
        if Network::from_p2pkh_prefix(payload[0]).is_none() {
            return Err(PrimitivesError::InvalidBase58(format!(
                "version byte {:#04x} is not a P2PKH address",
                payload[0]
            )));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(ScanTarget::KeyHash(hash))
    }

    fn matches(&self, key: &KeyPair) -> bool {
        match self {
            ScanTarget::PublicKey(point) => key.public_point() == point,
            ScanTarget::KeyHash(hash) => {
                key.compressed_public_key_hash() == *hash || key.uncompressed_public_key_hash() == *hash
            }
        }
    }
}

impl HdKeychain {
    /// Master node for `seed` on mainnet.
    pub fn from_seed(seed: &[u8]) -> Result<Self, PrimitivesError> {
        Self::from_seed_for(seed, Network::Mainnet)
    }

    /// Master node: `I = HMAC-SHA512("Bitcoin seed", seed)`, secret `IL`,
    /// chain code `IR`.
    pub fn from_seed_for(seed: &[u8], network: Network) -> Result<Self, PrimitivesError> {
        let i = Zeroizing::new(sha512_hmac(MASTER_HMAC_KEY, seed));
        let key = KeyPair::from_secret(&i[..32])?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(HdKeychain {
            key,
            chain_code,
            depth: 0,
            parent_fingerprint: 0,
            index: 0,
            hardened: false,
            network,
            cleared: false,
        })
    }

    /// Parse a Base58Check `xprv`/`xpub`/`tprv`/`tpub` string.
    pub fn from_extended_key(encoded: &str) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(base58::check_decode(encoded)?);
        Self::from_extended_key_bytes(&bytes).map_err(|e| {
            debug!(error = %e, "rejected extended key");
            e
        })
    }

    /// Parse the 78-byte wire form:
    /// `version(4) | depth(1) | parent fingerprint(4) | index(4) | chain code(32) | key(33)`.
    pub fn from_extended_key_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != EXTENDED_KEY_LEN {
            return Err(PrimitivesError::InvalidExtendedKeyLength(bytes.len()));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[0..4]);
        let (network, private) = Network::from_extended_key_version(version)?;

        let depth = bytes[4];
        let parent_fingerprint = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        let child = ChildNumber::from_wire(u32::from_be_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]));
        if depth == 0 && (parent_fingerprint != 0 || child.to_wire() != 0) {
            return Err(PrimitivesError::InvalidExtendedKey(
                "master key with non-zero parent fingerprint or index".into(),
            ));
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&bytes[13..45]);

        let key_data = &bytes[45..78];
        let key = if private {
            if key_data[0] != 0x00 {
                return Err(PrimitivesError::InvalidExtendedKey("private key data must start with 0x00".into()));
            }
            KeyPair::from_secret(&key_data[1..])?
        } else {
            if !matches!(key_data[0], 0x02 | 0x03) {
                return Err(PrimitivesError::InvalidExtendedKey("public key data must be compressed".into()));
            }
            KeyPair::from_public_key_bytes(key_data)?
        };

        Ok(HdKeychain {
            key,
            chain_code,
            depth,
            parent_fingerprint,
            index: child.index(),
            hardened: child.is_hardened(),
            network,
            cleared: false,
        })
    }

    fn serialize(&self, private: bool) -> Result<Zeroizing<[u8; EXTENDED_KEY_LEN]>, PrimitivesError> {
        self.ensure_live()?;
        let mut out = Zeroizing::new([0u8; EXTENDED_KEY_LEN]);
        out[0..4].copy_from_slice(&self.network.extended_key_version(private));
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint.to_be_bytes());
        out[9..13].copy_from_slice(&self.child_number().to_wire().to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);
        if private {
            let secret = self.key.secret_bytes().ok_or(PrimitivesError::NoSecretKey)?;
            out[46..78].copy_from_slice(&*secret);
        } else {
            out[45..78].copy_from_slice(&self.key.compressed_public_key());
        }
        Ok(out)
    }

    /// Fails with `KeychainCleared` after [`HdKeychain::clear`].
    pub fn extended_public_key_bytes(&self) -> Result<[u8; EXTENDED_KEY_LEN], PrimitivesError> {
        Ok(*self.serialize(false)?)
    }

    /// Fails with `NoSecretKey` on a public-only node.
    pub fn extended_private_key_bytes(&self) -> Result<Zeroizing<[u8; EXTENDED_KEY_LEN]>, PrimitivesError> {
        self.serialize(true)
    }

    pub fn extended_public_key(&self) -> Result<String, PrimitivesError> {
        Ok(base58::check_encode(&self.extended_public_key_bytes()?))
    }

    pub fn extended_private_key(&self) -> Result<Zeroizing<String>, PrimitivesError> {
        Ok(Zeroizing::new(base58::check_encode(&*self.extended_private_key_bytes()?)))
    }

    pub fn key(&self) -> &KeyPair {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> u32 {
        self.parent_fingerprint
    }

    /// Raw index, without the hardened bit.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    pub fn child_number(&self) -> ChildNumber {
        ChildNumber::from_wire(if self.hardened { self.index | HARDENED_BIT } else { self.index })
    }

    pub fn is_private(&self) -> bool {
        self.key.has_secret()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    fn ensure_live(&self) -> Result<(), PrimitivesError> {
        if self.cleared {
            return Err(PrimitivesError::KeychainCleared);
        }
        Ok(())
    }

    /// Hash160 of the compressed public key.
    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.key.compressed_public_key())
    }

    /// First four bytes of [`HdKeychain::identifier`], big-endian.
    pub fn fingerprint(&self) -> u32 {
        let id = self.identifier();
        u32::from_be_bytes([id[0], id[1], id[2], id[3]])
    }

    /// Copy of this node without the secret. Chain code and metadata are kept.
    pub fn to_public_only(&self) -> HdKeychain {
        let mut node = self.clone();
        node.key = self.key.public_only();
        node
    }

    /// Derive child `index` (at most `0x7fffffff`), hardened if requested.
    pub fn derive_child(&self, index: u32, hardened: bool) -> Result<HdKeychain, PrimitivesError> {
        Ok(self.derive_child_with_factor(index, hardened)?.0)
    }

    /// Like [`HdKeychain::derive_child`], also returning `IL`, the tweak
    /// added to the parent key.
    pub fn derive_child_with_factor(
        &self,
        index: u32,
        hardened: bool,
    ) -> Result<(HdKeychain, CurveScalar), PrimitivesError> {
        self.ensure_live()?;
        let child = ChildNumber::new(index, hardened)?;
        let depth = self.depth.checked_add(1).ok_or(PrimitivesError::MaxDepthExceeded)?;

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if hardened {
            let secret = self
                .key
                .secret_bytes()
                .ok_or(PrimitivesError::HardenedDerivationRequiresPrivateKey)?;
            data.push(0x00);
            data.extend_from_slice(&*secret);
        } else {
            data.extend_from_slice(&self.key.compressed_public_key());
        }
        data.extend_from_slice(&child.to_wire().to_be_bytes());

        let i = Zeroizing::new(sha512_hmac(&self.chain_code, &data));
        self.child_from_hmac(child, depth, &i)
    }

    /// Build the child from `I = IL || IR`.
    fn child_from_hmac(
        &self,
        child: ChildNumber,
        depth: u8,
        i: &[u8; 64],
    ) -> Result<(HdKeychain, CurveScalar), PrimitivesError> {
        let tweak = CurveScalar::from_bytes(&i[..32]).map_err(|_| self.invalid_child(child, "IL >= n"))?;

        let key = match self.key.secret_scalar() {
            Some(parent) => {
                let secret = tweak.add(parent);
                if secret.is_zero() {
                    return Err(self.invalid_child(child, "child secret is zero"));
                }
                KeyPair::from_scalar(secret)?
            }
            None => {
                let point = self.key.public_point().add_generator_mul(&tweak);
                if point.is_infinity() {
                    return Err(self.invalid_child(child, "child point is at infinity"));
                }
                KeyPair::from_public_point(point)?
            }
        };

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        let node = HdKeychain {
            key,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            index: child.index(),
            hardened: child.is_hardened(),
            network: self.network,
            cleared: false,
        };
        Ok((node, tweak))
    }

    fn invalid_child(&self, child: ChildNumber, reason: &str) -> PrimitivesError {
        warn!(
            parent_fingerprint = self.fingerprint(),
            index = child.index(),
            hardened = child.is_hardened(),
            reason,
            "invalid BIP32 child, retry with the next index"
        );
        PrimitivesError::InvalidChild { index: child.index() }
    }

    /// Key pair of child `index`.
    pub fn key_at_index(&self, index: u32, hardened: bool) -> Result<KeyPair, PrimitivesError> {
        Ok(self.derive_child(index, hardened)?.key.clone())
    }

    /// Walk `path` from this node. An empty path returns a copy of `self`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<HdKeychain, PrimitivesError> {
        let mut node = self.clone();
        for step in path.iter() {
            node = node.derive_child(step.index(), step.is_hardened())?;
        }
        Ok(node)
    }

    /// Parse `path` and walk it from this node.
    pub fn derive(&self, path: &str) -> Result<HdKeychain, PrimitivesError> {
        self.derive_path(&path.parse()?)
    }

    /// Scan children `start, start+1, ...` for one matching `target`,
    /// trying at most `limit` indices.
    ///
    /// Indices that yield an invalid child are skipped. Fails with
    /// `KeyNotFound` when nothing matches.
    pub fn find_child(
        &self,
        target: &ScanTarget,
        start: u32,
        hardened: bool,
        limit: u32,
    ) -> Result<HdKeychain, PrimitivesError> {
        for offset in 0..limit {
            let Some(index) = start.checked_add(offset).filter(|i| *i <= MAX_INDEX) else {
                break;
            };
            let child = match self.derive_child(index, hardened) {
                Ok(child) => child,
                Err(e) if e.is_retryable() => continue,
                Err(e) => return Err(e),
            };
            if target.matches(&child.key) {
                debug!(index, hardened, "found matching child");
                return Ok(child);
            }
        }
        debug!(start, limit, hardened, "no matching child");
        Err(PrimitivesError::KeyNotFound { limit })
    }

    /// Wipe the secret and chain code. The node stays usable only for
    /// metadata and public-key queries; derivation and serialization fail
    /// with `KeychainCleared`.
    pub fn clear(&mut self) {
        self.key.clear();
        self.chain_code.zeroize();
        self.cleared = true;
    }
}

impl Drop for HdKeychain {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}

impl PartialEq for HdKeychain {
    fn eq(&self, other: &Self) -> bool {
        self.network == other.network
            && self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.index == other.index
            && self.hardened == other.hardened
            && self.chain_code == other.chain_code
            && self.cleared == other.cleared
            && self.key == other.key
    }
}

impl Eq for HdKeychain {}

impl fmt::Debug for HdKeychain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdKeychain")
            .field("xpub", &self.extended_public_key().ok())
            .field("private", &self.is_private())
            .field("depth", &self.depth)
            .field("child", &self.child_number().to_string())
            .finish()
    }
}
