//! Pay-to-Public-Key-Hash.
//!
//! Locking script: `OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG`.
//! Signature script: `<DER signature || hash type> <public key>`.

use btc_primitives::ec::KeyPair;

use crate::sighash::SIGHASH_ALL;
use crate::template::{push_data, UnlockingScriptTemplate};
use crate::transaction::Transaction;
use crate::TransactionError;

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

/// 25-byte P2PKH locking script for `pubkey_hash`.
pub fn lock(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    push_data(&mut script, pubkey_hash);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}

/// Extract the key hash from a standard P2PKH locking script.
pub fn pubkey_hash(script: &[u8]) -> Option<[u8; 20]> {
    match script {
        [OP_DUP, OP_HASH160, 0x14, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG] if hash.len() == 20 => {
            let mut out = [0u8; 20];
            out.copy_from_slice(hash);
            Some(out)
        }
        _ => None,
    }
}

/// Signer for inputs spending a P2PKH output locked to `key`.
///
/// `hash_type` defaults to `SIGHASH_ALL`.
pub fn unlock(key: KeyPair, hash_type: Option<u32>) -> P2pkh {
    P2pkh { key, hash_type: hash_type.unwrap_or(SIGHASH_ALL) }
}

pub struct P2pkh {
    key: KeyPair,
    hash_type: u32,
}

impl P2pkh {
    /// The locking script this signer can spend; also the sighash subscript.
    pub fn locking_script(&self) -> Vec<u8> {
        lock(&self.key.public_key_hash())
    }
}

impl UnlockingScriptTemplate for P2pkh {
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Vec<u8>, TransactionError> {
        let hash = tx.signature_hash(input_index, &self.locking_script(), self.hash_type)?;
        // Only the low byte of the hash type travels with the signature.
        let signature = self.key.sign_with_hash_type(&hash, self.hash_type as u8)?;
        let public_key = self.key.public_key();

        let mut script = Vec::with_capacity(2 + signature.len() + public_key.len());
        push_data(&mut script, &signature);
        push_data(&mut script, &public_key);
        Ok(script)
    }

    fn estimate_length(&self) -> usize {
        // push + 72-byte signature with hash type, push + public key
        1 + 73 + 1 + if self.key.is_compressed() { 33 } else { 65 }
    }
}
