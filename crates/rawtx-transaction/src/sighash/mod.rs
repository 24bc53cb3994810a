//! Signature hash computation for transaction signing.
//!
//! Implements the original (pre-segwit, pre-FORKID) digest: the transaction
//! is serialized with the spent output's locking script standing in for the
//! signed input's unlocking script and every other input's script emptied,
//! the sighash type is appended as four little-endian bytes, and the result
//! is hashed with SHA-256d.

use rawtx_primitives::hash::sha256d;
use rawtx_primitives::util::ByteWriter;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Sign all inputs and all outputs.
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs and no outputs. Not supported by this builder.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and the output at the same index. Not supported by this builder.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Compute the serialized preimage for `input_index`.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input whose signature is being produced.
/// * `subscript` - Locking script of the output being spent.
/// * `sighash_type` - Must be [`SIGHASH_ALL`].
///
/// # Returns
/// The preimage bytes, or `TransactionError::InvalidInput` for an
/// unsupported sighash type or an out-of-range input index.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    subscript: &[u8],
    sighash_type: u32,
) -> Result<Vec<u8>, TransactionError> {
    if sighash_type != SIGHASH_ALL {
        return Err(TransactionError::InvalidInput(format!(
            "unsupported sighash type 0x{:02x}",
            sighash_type
        )));
    }
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidInput(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }

    let mut writer = ByteWriter::with_capacity(256);
    writer.write_u32_le(tx.version);

    writer.write_varint((tx.inputs.len() as u64).into());
    for (i, input) in tx.inputs.iter().enumerate() {
        let script: &[u8] = if i == input_index { subscript } else { &[] };
        input.write_with_script(&mut writer, script);
    }

    tx.write_outputs_and_lock_time(&mut writer);
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

/// Compute the 32-byte digest that is signed for `input_index`.
///
/// This is SHA-256d of [`calc_preimage`].
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    subscript: &[u8],
    sighash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, subscript, sighash_type)?;
    Ok(sha256d(&preimage))
}
