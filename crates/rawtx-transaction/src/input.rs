//! Transaction input referencing a previous output.
//!
//! Contains the outpoint being spent, the unlocking script, the sequence
//! number, and an optional copy of the spent output that signing reads its
//! value and locking script from.

use std::fmt;
use std::str::FromStr;

use rawtx_primitives::chainhash::{Hash, HASH_SIZE};
use rawtx_primitives::util::{ByteReader, ByteWriter};
use rawtx_script::Script;

use crate::output::TransactionOutput;
use crate::TransactionError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// Reference to an output of a previous transaction.
///
/// `txid` is held in internal (wire) order. Conventional display hex is the
/// byte-reversed form; use [`OutPoint::from_hex`] to parse it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub txid: Hash,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Hash, vout: u32) -> Self {
        OutPoint { txid, vout }
    }

    /// Build an outpoint from a display-order txid hex string.
    ///
    /// The string must be exactly 64 hex characters.
    pub fn from_hex(txid_hex: &str, vout: u32) -> Result<Self, TransactionError> {
        if txid_hex.len() != HASH_SIZE * 2 {
            return Err(TransactionError::InvalidInput(format!(
                "txid must be {} hex characters, got {}",
                HASH_SIZE * 2,
                txid_hex.len()
            )));
        }
        let txid = Hash::from_hex(txid_hex)
            .map_err(|e| TransactionError::InvalidInput(format!("txid: {}", e)))?;
        Ok(OutPoint { txid, vout })
    }

    pub(crate) fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.txid.as_bytes());
        writer.write_u32_le(self.vout);
    }

    pub(crate) fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid = reader.read_array::<HASH_SIZE>().map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {}", e))
        })?;
        let vout = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;
        Ok(OutPoint {
            txid: Hash::new(txid),
            vout,
        })
    }
}

/// Displays as `<txid>:<vout>` with the txid in display order.
impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl FromStr for OutPoint {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, vout) = s.rsplit_once(':').ok_or_else(|| {
            TransactionError::InvalidInput(format!("outpoint '{}' is not <txid>:<vout>", s))
        })?;
        let vout = vout
            .parse::<u32>()
            .map_err(|e| TransactionError::InvalidInput(format!("vout '{}': {}", vout, e)))?;
        OutPoint::from_hex(txid, vout)
    }
}

/// A single input in a transaction.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | source txid        | 32 bytes         |
/// | source vout        | 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    pub outpoint: OutPoint,

    /// The unlocking script (scriptSig). Empty until the input is signed.
    pub unlocking_script: Script,

    pub sequence_number: u32,

    /// The output being spent. Not serialized.
    source_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// Create an unsigned, finalized input spending `outpoint`.
    pub fn new(outpoint: OutPoint) -> Self {
        TransactionInput {
            outpoint,
            unlocking_script: Script::new(),
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            source_output: None,
        }
    }

    /// Deserialize an input from the standard wire format.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let outpoint = OutPoint::read_from(reader)?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {}", e))
        })?;

        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        Ok(TransactionInput {
            outpoint,
            unlocking_script: Script::from_bytes(script_bytes),
            sequence_number,
            source_output: None,
        })
    }

    /// Serialize this input with its own unlocking script.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        self.write_with_script(writer, self.unlocking_script.to_bytes());
    }

    /// Serialize this input with `script` in place of the unlocking script.
    ///
    /// Signature preimages use this to substitute the spent output's locking
    /// script, or an empty script for the inputs not being signed.
    pub fn write_with_script(&self, writer: &mut ByteWriter, script: &[u8]) {
        self.outpoint.write_to(writer);
        writer.write_var_bytes(script);
        writer.write_u32_le(self.sequence_number);
    }

    /// Attach the output being spent.
    pub fn set_source_output(&mut self, output: Option<TransactionOutput>) {
        self.source_output = output;
    }

    pub fn source_tx_output(&self) -> Option<&TransactionOutput> {
        self.source_output.as_ref()
    }

    pub fn source_tx_satoshis(&self) -> Option<u64> {
        self.source_output.as_ref().map(|o| o.satoshis)
    }

    pub fn source_tx_script(&self) -> Option<&Script> {
        self.source_output.as_ref().map(|o| &o.locking_script)
    }
}
