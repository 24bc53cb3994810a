//! Script chunk parsing and push-data encoding.
//!
//! A script chunk is either an opcode or a data push with its associated bytes.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The data payload, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Render as an ASM token: pushes as hex, everything else by name.
    pub fn to_asm_string(&self) -> String {
        if self.op > OP_0 && self.op <= OP_PUSHDATA4 {
            if let Some(ref data) = self.data {
                return hex::encode(data);
            }
        }
        opcode_to_string(self.op)
    }

    /// Whether the chunk is a direct push (opcode byte equals payload length).
    pub fn is_direct_push(&self) -> bool {
        (OP_DATA_1..=OP_DATA_75).contains(&self.op)
    }
}

/// Decode raw script bytes into chunks.
///
/// A top-level OP_RETURN consumes the remainder of the script as its data.
///
/// # Returns
/// The parsed chunks, or `ScriptError::DataTooSmall` if a push runs past the
/// end of the script.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];

        let (header_len, length) = match op {
            OP_RETURN => {
                chunks.push(ScriptChunk {
                    op,
                    data: Some(bytes[pos + 1..].to_vec()),
                });
                break;
            }
            OP_DATA_1..=OP_DATA_75 => (1, op as usize),
            OP_PUSHDATA1 => {
                let len = bytes.get(pos + 1).ok_or(ScriptError::DataTooSmall)?;
                (2, *len as usize)
            }
            OP_PUSHDATA2 => {
                let len = bytes.get(pos + 1..pos + 3).ok_or(ScriptError::DataTooSmall)?;
                (3, u16::from_le_bytes([len[0], len[1]]) as usize)
            }
            OP_PUSHDATA4 => {
                let len = bytes.get(pos + 1..pos + 5).ok_or(ScriptError::DataTooSmall)?;
                (5, u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize)
            }
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                pos += 1;
                continue;
            }
        };

        let start = pos + header_len;
        let data = bytes
            .get(start..start + length)
            .ok_or(ScriptError::DataTooSmall)?;
        chunks.push(ScriptChunk {
            op,
            data: Some(data.to_vec()),
        });
        pos = start + length;
    }

    Ok(chunks)
}

/// Compute the minimal push prefix for a payload of `data_len` bytes.
///
/// Direct push for 0-75 bytes, then OP_PUSHDATA1/2/4.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xFFFF_FFFF {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

/// Single-byte prefix for a direct push of 1 to 75 bytes.
///
/// # Returns
/// `ScriptError::PushTooLarge` for anything a single length byte cannot
/// express as a direct push, including the empty payload.
pub fn direct_push_prefix(data_len: usize) -> Result<u8, ScriptError> {
    if (OP_DATA_1 as usize..=OP_DATA_75 as usize).contains(&data_len) {
        Ok(data_len as u8)
    } else {
        Err(ScriptError::PushTooLarge {
            len: data_len,
            max: OP_DATA_75 as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_script_p2pkh() {
        let script = hex::decode("76a914e2a623699e81b291c0327f408fea765d534baa2a88ac").unwrap();
        let chunks = decode_script(&script).unwrap();
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0].op, OP_DUP);
        assert_eq!(chunks[1].op, OP_HASH160);
        assert_eq!(chunks[2].op, OP_DATA_20);
        assert_eq!(chunks[2].data.as_ref().unwrap().len(), 20);
        assert!(chunks[2].is_direct_push());
        assert_eq!(chunks[3].op, OP_EQUALVERIFY);
        assert_eq!(chunks[4].op, OP_CHECKSIG);
    }

    #[test]
    fn test_decode_script_empty() {
        assert!(decode_script(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_script_truncated_pushes() {
        // Direct push of 5 with only 2 bytes.
        assert!(matches!(decode_script(&[0x05, 0x01, 0x02]), Err(ScriptError::DataTooSmall)));
        // PUSHDATA1 with no length byte.
        assert!(decode_script(&[OP_PUSHDATA1]).is_err());
        // PUSHDATA2 with a one-byte length.
        assert!(decode_script(&[OP_PUSHDATA2, 0x01]).is_err());
        // PUSHDATA4 claiming 1 byte with none present.
        assert!(decode_script(&[OP_PUSHDATA4, 0x01, 0x00, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_decode_script_pushdata1() {
        let mut script = vec![OP_PUSHDATA1, 80];
        script.extend_from_slice(&[0xab; 80]);
        let chunks = decode_script(&script).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].op, OP_PUSHDATA1);
        assert!(!chunks[0].is_direct_push());
        assert_eq!(chunks[0].data.as_ref().unwrap().len(), 80);
    }

    #[test]
    fn test_decode_op_return_takes_rest() {
        let chunks = decode_script(&[OP_RETURN, 0x01, 0x02]).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data, Some(vec![0x01, 0x02]));
    }

    #[test]
    fn test_push_data_prefix_boundaries() {
        assert_eq!(push_data_prefix(20).unwrap(), vec![0x14]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![0x4b]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(255).unwrap(), vec![OP_PUSHDATA1, 0xff]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(
            push_data_prefix(0x10000).unwrap(),
            vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn test_direct_push_prefix_bounds() {
        assert_eq!(direct_push_prefix(1).unwrap(), 0x01);
        assert_eq!(direct_push_prefix(72).unwrap(), 0x48);
        assert_eq!(direct_push_prefix(75).unwrap(), 0x4b);
        assert!(matches!(
            direct_push_prefix(76),
            Err(ScriptError::PushTooLarge { len: 76, max: 75 })
        ));
        assert!(direct_push_prefix(0).is_err());
    }

    #[test]
    fn test_chunk_to_asm_string() {
        let data = ScriptChunk { op: 0x02, data: Some(vec![0xbe, 0xef]) };
        assert_eq!(data.to_asm_string(), "beef");
        let op = ScriptChunk { op: OP_CHECKSIG, data: None };
        assert_eq!(op.to_asm_string(), "OP_CHECKSIG");
    }
}
