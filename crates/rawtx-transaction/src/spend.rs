//! Single-input, two-output P2PKH spend.
//!
//! A [`SpendRequest`] carries everything needed to spend one P2PKH output:
//! the outpoint, its balance, the payment and fee, the spender's key
//! material and the recipient's public key hash. [`build_signed`] turns it
//! into a signed, broadcast-ready transaction:
//!
//! 1. validate the request before anything is encoded;
//! 2. build the template (payment output first, change second) with the
//!    spent output's locking script attached to the input;
//! 3. compute the SIGHASH_ALL digest and sign it canonically;
//! 4. place `<sig> <pubkey>` in the input and serialize;
//! 5. read the payload back and check it against the request.

use rawtx_primitives::chainhash::Hash;
use rawtx_primitives::ec::{PrivateKey, PublicKey, Signature};
use rawtx_primitives::hash::hash160;
use rawtx_script::p2pkh::{self, PUBLIC_KEY_HASH_LEN};
use tracing::{debug, instrument};

use crate::input::{OutPoint, TransactionInput, DEFAULT_SEQUENCE_NUMBER};
use crate::output::TransactionOutput;
use crate::sighash::SIGHASH_ALL;
use crate::signer::{verify_canonical, CanonicalSigner};
use crate::template::p2pkh as p2pkh_template;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// The spender's keys.
///
/// `public_key` is kept exactly as supplied (compressed or uncompressed
/// SEC1) because its Hash160 must equal `public_key_hash`.
#[derive(Clone, Debug)]
pub struct KeyMaterial {
    pub private_key: PrivateKey,
    pub public_key: Vec<u8>,
    pub public_key_hash: Vec<u8>,
}

impl KeyMaterial {
    pub fn new(private_key: PrivateKey, public_key: Vec<u8>, public_key_hash: Vec<u8>) -> Self {
        KeyMaterial {
            private_key,
            public_key,
            public_key_hash,
        }
    }

    /// Key material using the compressed public key of `private_key`.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.pub_key().to_compressed().to_vec();
        let public_key_hash = hash160(&public_key).to_vec();
        KeyMaterial {
            private_key,
            public_key,
            public_key_hash,
        }
    }

    /// Check that the three parts belong together.
    pub fn validate(&self) -> Result<(), TransactionError> {
        check_hash_len("spender public key hash", &self.public_key_hash)?;

        let parsed = PublicKey::from_bytes(&self.public_key)
            .map_err(|e| TransactionError::InvalidInput(format!("spender public key: {}", e)))?;

        if hash160(&self.public_key)[..] != self.public_key_hash[..] {
            return Err(TransactionError::InvalidInput(
                "spender public key does not hash to the spender public key hash".to_string(),
            ));
        }

        if self.private_key.pub_key() != parsed {
            return Err(TransactionError::InvalidInput(
                "spender private key does not match the spender public key".to_string(),
            ));
        }

        Ok(())
    }
}

/// Everything needed to build one signed spend.
#[derive(Clone, Debug)]
pub struct SpendRequest {
    pub outpoint: OutPoint,
    /// Value of the output being spent.
    pub balance: u64,
    pub payment: u64,
    pub fee: u64,
    pub spender: KeyMaterial,
    pub recipient_hash: Vec<u8>,
}

impl SpendRequest {
    /// Validate amounts and key material.
    ///
    /// # Returns
    /// * `TransactionError::InvalidInput` for a hash that is not 20 bytes,
    ///   key material that does not belong together, or
    ///   `payment + fee > balance`.
    /// * `TransactionError::EncodingOverflow` if `payment + fee` does not
    ///   fit in a `u64`.
    pub fn validate(&self) -> Result<(), TransactionError> {
        check_hash_len("recipient hash", &self.recipient_hash)?;
        self.spender.validate()?;
        self.change().map(|_| ())
    }

    /// `balance - payment - fee`.
    pub fn change(&self) -> Result<u64, TransactionError> {
        let spent = self.payment.checked_add(self.fee).ok_or_else(|| {
            TransactionError::EncodingOverflow(format!(
                "payment {} plus fee {} overflows",
                self.payment, self.fee
            ))
        })?;
        self.balance.checked_sub(spent).ok_or_else(|| {
            TransactionError::InvalidInput(format!(
                "payment {} plus fee {} exceeds balance {}",
                self.payment, self.fee, self.balance
            ))
        })
    }

    /// The payment output followed by the change output.
    ///
    /// A zero change output is still included.
    pub fn outputs(&self) -> Result<[TransactionOutput; 2], TransactionError> {
        let change = self.change()?;
        Ok([
            TransactionOutput::p2pkh(self.payment, &self.recipient_hash)?,
            TransactionOutput::p2pkh(change, &self.spender.public_key_hash)?,
        ])
    }

    /// The unsigned transaction.
    ///
    /// The input's unlocking script is empty and the spent output (balance
    /// locked to the spender hash) is attached for signing.
    pub fn template(&self) -> Result<Transaction, TransactionError> {
        let mut input = TransactionInput::new(self.outpoint);
        input.set_source_output(Some(TransactionOutput::p2pkh(
            self.balance,
            &self.spender.public_key_hash,
        )?));

        let mut tx = Transaction::new();
        tx.add_input(input);
        for output in self.outputs()? {
            tx.add_output(output);
        }
        Ok(tx)
    }

    /// Build and sign this request. See [`build_signed`].
    pub fn build_signed(&self, signer: &CanonicalSigner) -> Result<SignedSpend, TransactionError> {
        build_signed(self, signer)
    }
}

/// A signed spend ready for broadcast.
#[derive(Clone, Debug)]
pub struct SignedSpend {
    raw: Vec<u8>,
    tx: Transaction,
    txid: Hash,
    digest: [u8; 32],
}

impl SignedSpend {
    /// The serialized transaction.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.raw)
    }

    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn txid(&self) -> Hash {
        self.txid
    }

    /// The SIGHASH_ALL digest that was signed.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }
}

/// Validate, sign and serialize a spend.
///
/// The digest and the final payload come from the same template; only the
/// input's unlocking script differs between them. No bytes are produced if
/// any step fails.
#[instrument(level = "debug", skip_all, fields(outpoint = %request.outpoint))]
pub fn build_signed(
    request: &SpendRequest,
    signer: &CanonicalSigner,
) -> Result<SignedSpend, TransactionError> {
    request.validate()?;
    let change = request.change()?;
    debug!(
        balance = request.balance,
        payment = request.payment,
        fee = request.fee,
        change,
        "spend request validated"
    );

    let mut tx = request.template()?;
    let digest = tx.calc_input_signature_hash(0, SIGHASH_ALL)?;
    debug!(digest = %hex::encode(digest), "computed signature digest");

    let unlocker = p2pkh_template::unlock(
        &request.spender.private_key,
        &request.spender.public_key,
        *signer,
    );
    tx.inputs[0].unlocking_script = unlocker.sign(&tx, 0)?;

    let raw = tx.try_to_bytes()?;
    check_conformance(&raw, request)?;

    let txid = tx.tx_id();
    debug!(%txid, size = raw.len(), "signed spend assembled");

    Ok(SignedSpend {
        raw,
        tx,
        txid,
        digest,
    })
}

/// Parse `raw` and check that it is exactly the spend `request` describes.
///
/// Checks the one-input, two-output shape, version 1 and lock time 0, the
/// outpoint and final sequence, the payment output before the change output,
/// and an unlocking script of `<low-S sig || SIGHASH_ALL> <spender pubkey>`
/// whose signature verifies over the transaction's own digest.
///
/// # Returns
/// `TransactionError::InvalidInput` describing the first mismatch.
pub fn check_conformance(raw: &[u8], request: &SpendRequest) -> Result<(), TransactionError> {
    let tx = Transaction::from_bytes(raw)?;
    let mismatch = |what: &str| {
        Err(TransactionError::InvalidInput(format!(
            "nonconforming spend: {}",
            what
        )))
    };

    if tx.version != 1 || tx.lock_time != 0 {
        return mismatch("version must be 1 and lock time 0");
    }
    if tx.inputs.len() != 1 || tx.outputs.len() != 2 {
        return mismatch("must have one input and two outputs");
    }
    let input = &tx.inputs[0];
    if input.outpoint != request.outpoint || input.sequence_number != DEFAULT_SEQUENCE_NUMBER {
        return mismatch("input does not spend the requested outpoint");
    }
    if tx.outputs[..] != request.outputs()?[..] {
        return mismatch("outputs are not [payment, change]");
    }

    let (sig_bytes, pub_key) = p2pkh::parse_unlock_script(&input.unlocking_script)
        .map_err(|e| TransactionError::InvalidInput(format!("nonconforming spend: {}", e)))?;
    if pub_key != request.spender.public_key {
        return mismatch("unlocking script carries a different public key");
    }
    let (sighash_byte, der) = match sig_bytes.split_last() {
        Some((last, der)) => (*last, der),
        None => return mismatch("empty signature"),
    };
    if u32::from(sighash_byte) != SIGHASH_ALL {
        return mismatch("signature does not commit to SIGHASH_ALL");
    }
    let signature = Signature::from_der(der)
        .map_err(|e| TransactionError::InvalidInput(format!("nonconforming spend: {}", e)))?;

    let mut unsigned = tx.clone();
    unsigned.inputs[0].set_source_output(Some(TransactionOutput::p2pkh(
        request.balance,
        &request.spender.public_key_hash,
    )?));
    let digest = unsigned.calc_input_signature_hash(0, SIGHASH_ALL)?;
    let pub_key = PublicKey::from_bytes(&pub_key)
        .map_err(|e| TransactionError::InvalidInput(format!("nonconforming spend: {}", e)))?;
    verify_canonical(&digest, &signature, &pub_key)?;

    Ok(())
}

fn check_hash_len(what: &str, hash: &[u8]) -> Result<(), TransactionError> {
    if hash.len() != PUBLIC_KEY_HASH_LEN {
        return Err(TransactionError::InvalidInput(format!(
            "{} must be {} bytes, got {}",
            what,
            PUBLIC_KEY_HASH_LEN,
            hash.len()
        )));
    }
    Ok(())
}
