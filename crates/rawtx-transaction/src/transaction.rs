//! Core transaction type.
//!
//! Represents a transaction with version, inputs, outputs, and lock time.
//! Supports binary and hex serialization and transaction id computation.

use rawtx_primitives::chainhash::{double_hash_h, Hash};
use rawtx_primitives::util::{ByteReader, ByteWriter};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash;
use crate::TransactionError;

/// Largest count or script length a node accepts in a compact-size field.
pub const MAX_COMPACT_SIZE: usize = 0x0200_0000;

/// A transaction.
///
/// # Wire format
///
/// | Field        | Size         |
/// |--------------|--------------|
/// | version      | 4 bytes (LE) |
/// | input count  | VarInt       |
/// | inputs       | variable     |
/// | output count | VarInt       |
/// | outputs      | variable     |
/// | lock_time    | 4 bytes (LE) |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,

    pub inputs: Vec<TransactionInput>,

    /// Serialized in stored order.
    pub outputs: Vec<TransactionOutput>,

    pub lock_time: u32,
}

impl Transaction {
    /// Create an empty version 1 transaction with lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let input_count = read_count(reader, "input")?;
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining()));
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = read_count(reader, "output")?;
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining()));
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Serialize the transaction to its wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Serialize after checking that every value fits its field.
    ///
    /// # Returns
    /// `TransactionError::EncodingOverflow` if an input or output count, or a
    /// script length, exceeds [`MAX_COMPACT_SIZE`], or if the output values
    /// do not sum within `u64`.
    pub fn try_to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        check_compact_size("input count", self.inputs.len())?;
        check_compact_size("output count", self.outputs.len())?;
        for (i, input) in self.inputs.iter().enumerate() {
            check_compact_size(&format!("input {} script", i), input.unlocking_script.len())?;
        }
        for (i, output) in self.outputs.iter().enumerate() {
            check_compact_size(&format!("output {} script", i), output.locking_script.len())?;
        }
        self.total_output_satoshis().ok_or_else(|| {
            TransactionError::EncodingOverflow("sum of output values exceeds u64".to_string())
        })?;
        Ok(self.to_bytes())
    }

    pub(crate) fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u32_le(self.version);

        writer.write_varint((self.inputs.len() as u64).into());
        for input in &self.inputs {
            input.write_to(writer);
        }

        self.write_outputs_and_lock_time(writer);
    }

    /// Outputs and lock time, shared with the signature preimage.
    pub(crate) fn write_outputs_and_lock_time(&self, writer: &mut ByteWriter) {
        writer.write_varint((self.outputs.len() as u64).into());
        for output in &self.outputs {
            output.write_to(writer);
        }
        writer.write_u32_le(self.lock_time);
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Transaction id: SHA-256d of the serialized transaction.
    pub fn tx_id(&self) -> Hash {
        double_hash_h(&self.to_bytes())
    }

    /// Transaction id in conventional byte-reversed hex.
    pub fn tx_id_hex(&self) -> String {
        self.tx_id().to_string()
    }

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Sum of output values, or `None` on overflow.
    pub fn total_output_satoshis(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.satoshis))
    }

    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Compute the signature hash for an input from its attached source output.
    ///
    /// # Returns
    /// `TransactionError::InvalidInput` if the index is out of range or the
    /// input has no source output attached.
    pub fn calc_input_signature_hash(
        &self,
        input_index: usize,
        sighash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            TransactionError::InvalidInput(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                self.inputs.len()
            ))
        })?;

        let subscript = input.source_tx_script().ok_or_else(|| {
            TransactionError::InvalidInput(format!(
                "input {} has no source output attached",
                input_index
            ))
        })?;

        sighash::signature_hash(self, input_index, subscript.to_bytes(), sighash_type)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn read_count(reader: &mut ByteReader, what: &str) -> Result<usize, TransactionError> {
    let count = reader.read_varint().map_err(|e| {
        TransactionError::SerializationError(format!("reading {} count: {}", what, e))
    })?;
    usize::try_from(count.value())
        .ok()
        .filter(|&n| n <= MAX_COMPACT_SIZE)
        .ok_or_else(|| {
            TransactionError::SerializationError(format!(
                "{} count {} too large",
                what,
                count.value()
            ))
        })
}

fn check_compact_size(what: &str, len: usize) -> Result<(), TransactionError> {
    if len > MAX_COMPACT_SIZE {
        return Err(TransactionError::EncodingOverflow(format!(
            "{} of {} exceeds {}",
            what, len, MAX_COMPACT_SIZE
        )));
    }
    Ok(())
}
