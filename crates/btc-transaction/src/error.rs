/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// An input index outside the transaction's input list.
    #[error("input index {index} out of range for {len} inputs")]
    IndexOutOfRange { index: usize, len: usize },
    /// Truncated, malformed or trailing wire data.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Forwarded from key handling or hashing.
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
