//! Transaction container and its standard wire serialization.

use std::fmt;

use btc_primitives::hash::sha256d;
use btc_primitives::util::{ByteReader, ByteWriter, VarInt};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash;
use crate::template::UnlockingScriptTemplate;
use crate::TransactionError;

/// A Bitcoin transaction.
///
/// # Wire format
///
/// | Field        | Size          |
/// |--------------|---------------|
/// | version      | 4 bytes (LE)  |
/// | input count  | VarInt        |
/// | inputs       | variable      |
/// | output count | VarInt        |
/// | outputs      | variable      |
/// | lock_time    | 4 bytes (LE)  |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Empty version-1 transaction.
    pub fn new() -> Self {
        Transaction { version: 1, inputs: Vec::new(), outputs: Vec::new(), lock_time: 0 }
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::Serialization(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Parse exactly one transaction; trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::Serialization(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let field = |name: &'static str| {
            move |e: btc_primitives::PrimitivesError| {
                TransactionError::Serialization(format!("reading {name}: {e}"))
            }
        };
        let version = reader.read_u32_le().map_err(field("version"))?;

        let input_count = reader.read_varint().map_err(field("input count"))?.0;
        // Counts come from untrusted data; let the reader fail on truncation
        // instead of pre-allocating.
        let mut inputs = Vec::new();
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_varint().map_err(field("output count"))?.0;
        let mut outputs = Vec::new();
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(field("lock time"))?;
        Ok(Transaction { version, inputs, outputs, lock_time })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32_le(self.version);
        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(writer);
        }
        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(writer);
        }
        writer.write_u32_le(self.lock_time);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Double SHA-256 of the serialization, in internal byte order.
    pub fn txid(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    /// Txid as conventionally displayed (byte-reversed hex).
    pub fn txid_hex(&self) -> String {
        let mut id = self.txid();
        id.reverse();
        hex::encode(id)
    }

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    /// Legacy signature hash of input `input_index`; see [`sighash::signature_hash`].
    pub fn signature_hash(
        &self,
        input_index: usize,
        subscript: &[u8],
        hash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        sighash::signature_hash(self, input_index, subscript, hash_type)
    }

    /// Produce the signature script for `input_index` with `template` and
    /// store it on that input.
    pub fn sign_input(
        &mut self,
        input_index: usize,
        template: &impl UnlockingScriptTemplate,
    ) -> Result<(), TransactionError> {
        let script = template.sign(self, input_index)?;
        let len = self.inputs.len();
        let input = self
            .inputs
            .get_mut(input_index)
            .ok_or(TransactionError::IndexOutOfRange { index: input_index, len })?;
        input.script = script;
        Ok(())
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
