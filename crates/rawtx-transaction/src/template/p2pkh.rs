//! Pay-to-Public-Key-Hash unlocking template.
//!
//! Signs an input with the legacy SIGHASH_ALL digest through a
//! [`CanonicalSigner`] and produces `<DER sig || 0x01> <pubkey>`.

use rawtx_primitives::ec::PrivateKey;
use rawtx_script::{p2pkh, Script};

use crate::sighash::SIGHASH_ALL;
use crate::signer::CanonicalSigner;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Largest DER signature plus the sighash byte.
const MAX_SIG_PUSH_LEN: usize = 73;

/// P2PKH signing template.
///
/// Holds the public key bytes exactly as they hash to the locked value, so
/// a key published uncompressed keeps its uncompressed encoding.
pub struct P2PKH<'a> {
    private_key: &'a PrivateKey,
    public_key: &'a [u8],
    signer: CanonicalSigner,
}

impl<'a> P2PKH<'a> {
    pub fn new(private_key: &'a PrivateKey, public_key: &'a [u8], signer: CanonicalSigner) -> Self {
        P2PKH {
            private_key,
            public_key,
            signer,
        }
    }
}

/// Create a P2PKH unlocker.
pub fn unlock<'a>(
    private_key: &'a PrivateKey,
    public_key: &'a [u8],
    signer: CanonicalSigner,
) -> P2PKH<'a> {
    P2PKH::new(private_key, public_key, signer)
}

impl UnlockingScriptTemplate for P2PKH<'_> {
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError> {
        let digest = tx.calc_input_signature_hash(input_index, SIGHASH_ALL)?;
        let signature = self.signer.sign(&digest, self.private_key)?;
        Ok(p2pkh::unlock_script(
            &signature.to_script_bytes(),
            self.public_key,
        )?)
    }

    fn estimate_length(&self) -> usize {
        1 + MAX_SIG_PUSH_LEN + 1 + self.public_key.len()
    }
}
