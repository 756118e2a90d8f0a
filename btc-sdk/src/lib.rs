#![deny(missing_docs)]

//! Bitcoin SDK.
//!
//! Re-exports the primitives and transaction crates for single-crate usage.

pub use btc_primitives as primitives;
pub use btc_transaction as transaction;
