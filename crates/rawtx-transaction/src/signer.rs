//! Canonical (low-S) ECDSA signing over a signature digest.
//!
//! Every signature leaving this module has `s <= n/2` and has been verified
//! against the public key recomputed from the signing key.

use rand::rngs::OsRng;
use rawtx_primitives::ec::{PrivateKey, PublicKey, Signature};
use tracing::debug;

use crate::sighash::SIGHASH_ALL;
use crate::TransactionError;

/// Upper bound on signing attempts under [`CanonicalPolicy::Retry`].
pub const MAX_RETRY_ATTEMPTS: u32 = 16;

/// How a high-S signature is made canonical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CanonicalPolicy {
    /// Replace `s` with `n - s`. Deterministic, one step.
    #[default]
    Negate,
    /// Sign again with fresh nonce entropy until `s` is low.
    ///
    /// The first attempt uses the plain RFC6979 nonce. `max_attempts` is
    /// capped at [`MAX_RETRY_ATTEMPTS`].
    Retry { max_attempts: u32 },
}

/// A low-S signature with the sighash type it commits to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalSignature {
    pub signature: Signature,
    pub sighash_type: u32,
}

impl CanonicalSignature {
    /// DER encoding followed by the sighash type byte, as pushed in an
    /// unlocking script.
    pub fn to_script_bytes(&self) -> Vec<u8> {
        let mut out = self.signature.to_der();
        out.push(self.sighash_type as u8);
        out
    }

    pub fn is_low_s(&self) -> bool {
        self.signature.is_low_s()
    }
}

/// Signs digests under a [`CanonicalPolicy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalSigner {
    policy: CanonicalPolicy,
}

impl CanonicalSigner {
    pub fn new(policy: CanonicalPolicy) -> Self {
        CanonicalSigner { policy }
    }

    pub fn policy(&self) -> CanonicalPolicy {
        self.policy
    }

    /// Sign `digest` with `key` and return a verified, low-S signature
    /// committing to `SIGHASH_ALL`.
    ///
    /// # Returns
    /// * `TransactionError::CanonicalRetryExhausted` when the retry policy
    ///   never produced a low `s`.
    /// * `TransactionError::SignatureSelfVerificationFailed` when the result
    ///   does not verify against the key's own public key.
    pub fn sign(
        &self,
        digest: &[u8; 32],
        key: &PrivateKey,
    ) -> Result<CanonicalSignature, TransactionError> {
        let signature = match self.policy {
            CanonicalPolicy::Negate => {
                let mut sig = Signature::sign_unnormalized(digest, key)?;
                if sig.normalize_s() {
                    debug!("negated high-S signature");
                }
                sig
            }
            CanonicalPolicy::Retry { max_attempts } => sign_until_low_s(digest, key, max_attempts)?,
        };

        verify_canonical(digest, &signature, &key.pub_key())?;

        Ok(CanonicalSignature {
            signature,
            sighash_type: SIGHASH_ALL,
        })
    }
}

fn sign_until_low_s(
    digest: &[u8; 32],
    key: &PrivateKey,
    max_attempts: u32,
) -> Result<Signature, TransactionError> {
    let attempts = max_attempts.min(MAX_RETRY_ATTEMPTS);
    for attempt in 1..=attempts {
        let sig = if attempt == 1 {
            Signature::sign_unnormalized(digest, key)?
        } else {
            Signature::sign_randomized(digest, key, &mut OsRng)?
        };
        if sig.is_low_s() {
            debug!(attempt, "canonical signature found");
            return Ok(sig);
        }
        debug!(attempt, "high-S signature discarded");
    }
    Err(TransactionError::CanonicalRetryExhausted { attempts })
}

/// Check that `signature` is low-S and verifies over `digest` under `pub_key`.
pub(crate) fn verify_canonical(
    digest: &[u8; 32],
    signature: &Signature,
    pub_key: &PublicKey,
) -> Result<(), TransactionError> {
    if !signature.is_low_s() || !pub_key.verify(digest, signature) {
        return Err(TransactionError::SignatureSelfVerificationFailed);
    }
    Ok(())
}
