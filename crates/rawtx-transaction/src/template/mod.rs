//! Script templates that produce unlocking scripts during signing.

pub mod p2pkh;

use rawtx_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Trait for script templates that produce unlocking scripts.
///
/// `sign` receives the full transaction and the input index, computes the
/// signature digest, signs it, and returns the unlocking script.
pub trait UnlockingScriptTemplate {
    /// Produce an unlocking script for the given input.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError>;

    /// Upper bound on the unlocking script length in bytes.
    fn estimate_length(&self) -> usize;
}
