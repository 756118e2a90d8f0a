//! Script templates used to sign transaction inputs.

pub mod p2pkh;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Produces the signature script for one input of a transaction.
pub trait UnlockingScriptTemplate {
    /// Build the signature script for `input_index`.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Vec<u8>, TransactionError>;

    /// Upper bound of the script length, for fee estimation.
    fn estimate_length(&self) -> usize;
}

/// Minimal data push for payloads shorter than `OP_PUSHDATA1`.
pub(crate) fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    debug_assert!(data.len() < OP_PUSHDATA1 as usize);
    script.push(data.len() as u8);
    script.extend_from_slice(data);
}

pub(crate) const OP_PUSHDATA1: u8 = 0x4c;
