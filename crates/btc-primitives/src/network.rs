//! Network parameters.
//!
//! The only configuration the primitives need: which version bytes to put
//! in front of extended keys, WIF secrets and P2PKH addresses.

use crate::PrimitivesError;

/// Mainnet `xprv` version bytes.
pub const MAINNET_PRIVATE: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];
/// Mainnet `xpub` version bytes.
pub const MAINNET_PUBLIC: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
/// Testnet `tprv` version bytes.
pub const TESTNET_PRIVATE: [u8; 4] = [0x04, 0x35, 0x83, 0x94];
/// Testnet `tpub` version bytes.
pub const TESTNET_PUBLIC: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Extended-key version bytes for private or public nodes.
    pub fn extended_key_version(&self, private: bool) -> [u8; 4] {
        match (self, private) {
            (Network::Mainnet, true) => MAINNET_PRIVATE,
            (Network::Mainnet, false) => MAINNET_PUBLIC,
            (Network::Testnet, true) => TESTNET_PRIVATE,
            (Network::Testnet, false) => TESTNET_PUBLIC,
        }
    }

    /// Map extended-key version bytes back to `(network, is_private)`.
    pub fn from_extended_key_version(version: [u8; 4]) -> Result<(Network, bool), PrimitivesError> {
        match version {
            MAINNET_PRIVATE => Ok((Network::Mainnet, true)),
            MAINNET_PUBLIC => Ok((Network::Mainnet, false)),
            TESTNET_PRIVATE => Ok((Network::Testnet, true)),
            TESTNET_PUBLIC => Ok((Network::Testnet, false)),
            other => Err(PrimitivesError::UnsupportedVersion(other)),
        }
    }

    /// Prefix byte for WIF-encoded secrets.
    pub fn wif_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xEF,
        }
    }

    pub fn from_wif_prefix(prefix: u8) -> Option<Network> {
        match prefix {
            0x80 => Some(Network::Mainnet),
            0xEF => Some(Network::Testnet),
            _ => None,
        }
    }

    /// Version byte for P2PKH addresses.
    pub fn p2pkh_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6F,
        }
    }

    pub fn from_p2pkh_prefix(prefix: u8) -> Option<Network> {
        match prefix {
            0x00 => Some(Network::Mainnet),
            0x6F => Some(Network::Testnet),
            _ => None,
        }
    }
}
