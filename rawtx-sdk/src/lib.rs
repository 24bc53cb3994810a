#![deny(missing_docs)]

//! Raw transaction SDK.
//!
//! Re-exports the raw transaction crates for single-crate usage.

pub use rawtx_primitives as primitives;
pub use rawtx_script as script;
pub use rawtx_transaction as transaction;
pub use rawtx_p2p as p2p;

pub use rawtx_transaction::{
    build_signed, CanonicalPolicy, CanonicalSigner, KeyMaterial, OutPoint, SignedSpend,
    SpendRequest, TransactionError,
};
