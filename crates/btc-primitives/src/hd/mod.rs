//! BIP32 hierarchical deterministic keychains.

pub mod keychain;
pub mod path;

pub use keychain::{HdKeychain, ScanTarget, HARDENED_BIT, MAX_INDEX};
pub use path::{ChildNumber, DerivationPath};
