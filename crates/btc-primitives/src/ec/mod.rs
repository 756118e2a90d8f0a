//! Elliptic curve cryptography on secp256k1.
//!
//! Scalars and points are thin constant-time wrappers over `k256`; the
//! key pair adds Bitcoin's signing conventions (low-S, compact recoverable
//! signatures, compression flag) and `canonical` holds the consensus
//! encoding checks.

pub mod scalar;
pub mod point;
pub mod key;
pub mod signature;
pub mod canonical;
pub mod message;

pub use canonical::CanonicalError;
pub use key::KeyPair;
pub use point::CurvePoint;
pub use scalar::CurveScalar;
pub use signature::Signature;
