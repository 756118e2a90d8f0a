//! Bitcoin primitives.
//!
//! Foundational building blocks shared by the rest of the SDK:
//! - Hash collaborators (SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC-SHA512)
//! - Base58Check encoding
//! - Wire-format readers and writers with VarInt support
//! - Arbitrary-precision modular arithmetic (`BigNumber`)
//! - secp256k1 scalars, points, key pairs, signatures and canonical checks
//! - BIP32 hierarchical deterministic keychains

pub mod hash;
pub mod network;
pub mod util;
pub mod base58;
pub mod bignum;
pub mod ec;
pub mod hd;

mod error;
pub use error::PrimitivesError;
pub use network::Network;
