/// Raw transaction building, signing, and serialization.
///
/// Provides the Transaction type with inputs and outputs, the legacy
/// signature hash, a canonical low-S signer, and the single-input
/// two-output P2PKH spend pipeline.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod signer;
pub mod spend;
pub mod template;

mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::{OutPoint, TransactionInput};
pub use output::TransactionOutput;
pub use signer::{CanonicalPolicy, CanonicalSignature, CanonicalSigner};
pub use spend::{build_signed, check_conformance, KeyMaterial, SignedSpend, SpendRequest};
