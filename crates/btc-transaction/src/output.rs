//! Transaction output: an amount and a locking script.

use btc_primitives::util::{ByteReader, ByteWriter};

use crate::TransactionError;

/// A single transaction output.
///
/// `value` is signed because the legacy SIGHASH_SINGLE preimage writes
/// placeholder outputs with a value of -1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    pub value: i64,
    pub script: Vec<u8>,
}

impl TransactionOutput {
    pub fn new(value: i64, script: Vec<u8>) -> Self {
        TransactionOutput { value, script }
    }

    /// Placeholder output used for the outputs before the signed one in a
    /// SIGHASH_SINGLE preimage.
    pub fn null() -> Self {
        TransactionOutput { value: -1, script: Vec::new() }
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let value = reader
            .read_u64_le()
            .map_err(|e| TransactionError::Serialization(format!("reading output value: {e}")))?
            as i64;
        let script = reader
            .read_var_bytes()
            .map_err(|e| TransactionError::Serialization(format!("reading output script: {e}")))?
            .to_vec();
        Ok(TransactionOutput { value, script })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_i64_le(self.value);
        writer.write_var_bytes(&self.script);
    }
}
