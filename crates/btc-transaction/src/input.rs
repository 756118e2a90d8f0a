//! Transaction input: a reference to a previous output plus its script.

use btc_primitives::util::{ByteReader, ByteWriter};

use crate::TransactionError;

/// Sequence number of a final input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single transaction input.
///
/// # Wire format
///
/// | Field      | Size          |
/// |------------|---------------|
/// | prev_txid  | 32 bytes      |
/// | prev_index | 4 bytes (LE)  |
/// | script len | VarInt        |
/// | script     | variable      |
/// | sequence   | 4 bytes (LE)  |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Txid of the spent output, in internal byte order.
    pub prev_txid: [u8; 32],
    pub prev_index: u32,
    /// Signature script (scriptSig). Empty until signed.
    pub script: Vec<u8>,
    pub sequence: u32,
}

impl TransactionInput {
    pub fn new(prev_txid: [u8; 32], prev_index: u32) -> Self {
        TransactionInput {
            prev_txid,
            prev_index,
            script: Vec::new(),
            sequence: DEFAULT_SEQUENCE_NUMBER,
        }
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let field = |name: &'static str| {
            move |e: btc_primitives::PrimitivesError| {
                TransactionError::Serialization(format!("reading {name}: {e}"))
            }
        };
        let prev_txid = reader.read_array::<32>().map_err(field("previous txid"))?;
        let prev_index = reader.read_u32_le().map_err(field("previous output index"))?;
        let script = reader.read_var_bytes().map_err(field("input script"))?.to_vec();
        let sequence = reader.read_u32_le().map_err(field("sequence"))?;
        Ok(TransactionInput { prev_txid, prev_index, script, sequence })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.prev_txid);
        writer.write_u32_le(self.prev_index);
        writer.write_var_bytes(&self.script);
        writer.write_u32_le(self.sequence);
    }
}
