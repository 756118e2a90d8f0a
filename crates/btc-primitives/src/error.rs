use crate::ec::canonical::CanonicalError;

/// Unified error type for all primitives operations.
///
/// `InvalidChild` is the only variant callers are expected to recover from
/// automatically, by retrying derivation at the next index.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("operation requires a secret key")]
    NoSecretKey,

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("keychain has been cleared")]
    KeychainCleared,

    #[error("hardened derivation requires a private key")]
    HardenedDerivationRequiresPrivateKey,

    #[error("invalid child at index {index}, retry with the next index")]
    InvalidChild { index: u32 },

    #[error("maximum derivation depth exceeded")]
    MaxDepthExceeded,

    #[error("unsupported extended key version: {}", hex::encode(.0))]
    UnsupportedVersion([u8; 4]),

    #[error("child index {0} exceeds 0x7fffffff")]
    InvalidChildIndex(u32),

    #[error("invalid extended key length: expected 78, got {0}")]
    InvalidExtendedKeyLength(usize),

    #[error("invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("no matching child within {limit} indices")]
    KeyNotFound { limit: u32 },

    #[error("non-canonical encoding: {0}")]
    NonCanonical(#[from] CanonicalError),

    #[error("invalid WIF: {0}")]
    InvalidWif(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl PrimitivesError {
    /// Whether the failed operation may succeed if retried at the next child index.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PrimitivesError::InvalidChild { .. })
    }
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
