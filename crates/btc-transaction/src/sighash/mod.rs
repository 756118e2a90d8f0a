//! Legacy (pre-segwit) signature hashing.
//!
//! The digest signed for an input commits to a transformed copy of the
//! transaction. Which parts are committed depends on the hash type: a base
//! mode (ALL, NONE, SINGLE) optionally combined with ANYONECANPAY.

use btc_primitives::hash::sha256d;
use btc_primitives::util::ByteWriter;
use tracing::trace;

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Commit to every input and output.
pub const SIGHASH_ALL: u32 = 0x01;

/// Commit to every input and no outputs.
pub const SIGHASH_NONE: u32 = 0x02;

/// Commit to every input and only the output at the signed input's index.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Modifier: commit to the signed input only.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask extracting the base mode from a hash type.
pub const SIGHASH_MASK: u32 = 0x1f;

/// Digest returned for SIGHASH_SINGLE when the signed input has no
/// matching output: the integer 1 as 32 little-endian bytes. Consensus
/// depends on this value.
pub const SIGHASH_SINGLE_NO_OUTPUT: [u8; 32] = {
    let mut one = [0u8; 32];
    one[0] = 1;
    one
};

/// Compute the legacy signature hash for input `input_index`.
///
/// # Arguments
/// * `tx`          - The transaction; it is never modified.
/// * `input_index` - The input being signed.
/// * `subscript`   - Script placed in the signed input (the spent output's
///   script, or the P2SH redeem script). Treated as opaque bytes.
/// * `hash_type`   - Base mode plus optional ANYONECANPAY.
///
/// # Returns
/// The double-SHA-256 of the preimage, [`SIGHASH_SINGLE_NO_OUTPUT`] for a
/// SINGLE signature without a matching output, or `IndexOutOfRange`.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    subscript: &[u8],
    hash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    match calc_preimage(tx, input_index, subscript, hash_type)? {
        Some(preimage) => Ok(sha256d(&preimage)),
        None => Ok(SIGHASH_SINGLE_NO_OUTPUT),
    }
}

/// Build the bytes that [`signature_hash`] digests.
///
/// Returns `None` when SIGHASH_SINGLE has no output at `input_index`; in
/// that case no preimage exists and the fixed digest is used instead.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    subscript: &[u8],
    hash_type: u32,
) -> Result<Option<Vec<u8>>, TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::IndexOutOfRange { index: input_index, len: tx.inputs.len() });
    }

    let base = hash_type & SIGHASH_MASK;
    if base == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        trace!(input_index, outputs = tx.outputs.len(), "SIGHASH_SINGLE without matching output");
        return Ok(None);
    }

    let mut scratch = tx.clone();

    for (i, input) in scratch.inputs.iter_mut().enumerate() {
        if i == input_index {
            input.script = subscript.to_vec();
        } else {
            input.script.clear();
            if base == SIGHASH_NONE || base == SIGHASH_SINGLE {
                input.sequence = 0;
            }
        }
    }

    if base == SIGHASH_NONE {
        scratch.outputs.clear();
    } else if base == SIGHASH_SINGLE {
        scratch.outputs.truncate(input_index + 1);
        for output in &mut scratch.outputs[..input_index] {
            *output = TransactionOutput::null();
        }
    }

    if hash_type & SIGHASH_ANYONECANPAY != 0 {
        let signed = scratch.inputs.swap_remove(input_index);
        scratch.inputs = vec![signed];
    }

    let mut writer = ByteWriter::with_capacity(256);
    scratch.write_to(&mut writer);
    writer.write_u32_le(hash_type);
    Ok(Some(writer.into_bytes()))
}
