/// Script type - a sequence of opcodes and data pushes.
///
/// Locking scripts sit in transaction outputs and unlocking scripts in
/// inputs. The Script wraps a `Vec<u8>` and provides construction,
/// P2PKH classification, serialization and ASM output.

use std::fmt;

use crate::chunk::{decode_script, direct_push_prefix, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq)]
pub struct Script(Vec<u8>);

impl Script {
    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string (e.g. "76a914...88ac").
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Create a script from an ASM string.
    ///
    /// Known opcode names are emitted directly and every other token is
    /// treated as hex push data.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for section in asm.split_whitespace() {
            if let Some(opcode) = string_to_opcode(section) {
                script.0.push(opcode);
            } else {
                let data = hex::decode(section).map_err(|_| {
                    ScriptError::InvalidScript(format!("bad ASM token '{}'", section))
                })?;
                script.append_push_data(&data)?;
            }
        }
        Ok(script)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Render the script as space-separated ASM.
    ///
    /// Returns an empty string for empty or malformed scripts.
    pub fn to_asm(&self) -> String {
        match decode_script(&self.0) {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    /// Return a reference to the underlying bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the script and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if this is a Pay-to-Public-Key-Hash (P2PKH) locking script.
    ///
    /// Pattern: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Extract the 20-byte public key hash from a P2PKH locking script.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[3..23]);
        Ok(hash)
    }

    /// Parse the script into decoded chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    /// Append data with the minimal push prefix.
    ///
    /// Direct push for 1-75 bytes, OP_PUSHDATA1 for 76-255, OP_PUSHDATA2 for
    /// 256-65535, OP_PUSHDATA4 beyond.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append data as a single-byte-length direct push.
    ///
    /// # Returns
    /// `ScriptError::PushTooLarge` if `data` is empty or longer than 75
    /// bytes. The script is left unchanged on error.
    pub fn append_direct_push(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = direct_push_prefix(data.len())?;
        self.0.push(prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append raw opcodes.
    ///
    /// Rejects push opcodes (OP_DATA_1..OP_PUSHDATA4); use
    /// `append_push_data` for those.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        for &op in opcodes {
            if (OP_DATA_1..=OP_PUSHDATA4).contains(&op) {
                return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op)));
            }
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH_HEX: &str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";

    #[test]
    fn test_from_hex_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).expect("valid hex should parse");
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert_eq!(script.len(), 25);
    }

    #[test]
    fn test_from_hex_empty_and_invalid() {
        assert!(Script::from_hex("").unwrap().is_empty());
        assert!(Script::from_hex("ZZZZ").is_err());
    }

    #[test]
    fn test_to_asm_p2pkh() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(
            script.to_asm(),
            "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG"
        );
        assert_eq!(Script::new().to_asm(), "");
        // Truncated push renders as empty.
        assert_eq!(Script::from_bytes(&[0x05, 0x01]).to_asm(), "");
    }

    #[test]
    fn test_from_asm_p2pkh() {
        let asm = "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG";
        let script = Script::from_asm(asm).unwrap();
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert!(Script::from_asm("").unwrap().is_empty());
        assert!(Script::from_asm("OP_DUP nothex").is_err());
    }

    #[test]
    fn test_is_p2pkh() {
        assert!(Script::from_hex("76a91403ececf2d12a7f614aef4c82ecf13c303bd9975d88ac")
            .unwrap()
            .is_p2pkh());
        // P2SH
        assert!(!Script::from_hex("a9149de5aeaff9c48431ba4dd6e8af73d51f38e451cb87")
            .unwrap()
            .is_p2pkh());
        // Wrong final opcode.
        assert!(!Script::from_hex("76a91404d03f746652cfcb6cb55119ab473a045137d26588ad")
            .unwrap()
            .is_p2pkh());
    }

    #[test]
    fn test_public_key_hash() {
        let script =
            Script::from_hex("76a91404d03f746652cfcb6cb55119ab473a045137d26588ac").unwrap();
        let pkh = script.public_key_hash().unwrap();
        assert_eq!(hex::encode(pkh), "04d03f746652cfcb6cb55119ab473a045137d265");

        assert!(matches!(Script::new().public_key_hash(), Err(ScriptError::EmptyScript)));
        assert!(matches!(
            Script::from_hex("76").unwrap().public_key_hash(),
            Err(ScriptError::NotP2PKH)
        ));
    }

    #[test]
    fn test_append_push_data() {
        let mut script = Script::new();
        script.append_push_data(&[0x01, 0x02, 0x03, 0x04, 0x05]).unwrap();
        assert_eq!(script.to_hex(), "050102030405");

        let mut script = Script::new();
        script.append_push_data(&[0xAA; 80]).unwrap();
        assert_eq!(&script.to_hex()[..4], "4c50");
        assert_eq!(script.len(), 2 + 80);

        let mut script = Script::new();
        script.append_push_data(&[0xBB; 256]).unwrap();
        assert_eq!(&script.to_hex()[..6], "4d0001");
    }

    #[test]
    fn test_append_direct_push() {
        let mut script = Script::new();
        script.append_direct_push(&[0x11; 72]).unwrap();
        assert_eq!(script.to_bytes()[0], 72);
        assert_eq!(script.len(), 73);

        let before = script.clone();
        assert!(matches!(
            script.append_direct_push(&[0x22; 76]),
            Err(ScriptError::PushTooLarge { len: 76, .. })
        ));
        assert_eq!(script, before);
    }

    #[test]
    fn test_append_opcodes() {
        let mut script = Script::new();
        script.append_opcodes(&[OP_DUP, OP_HASH160]).unwrap();
        assert_eq!(script.to_asm(), "OP_DUP OP_HASH160");
        assert!(script.append_opcodes(&[OP_EQUAL, OP_PUSHDATA1]).is_err());
        assert!(script.append_opcodes(&[OP_DATA_20]).is_err());
    }

    #[test]
    fn test_serde() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        let json_str = serde_json::to_string(&script).unwrap();
        assert_eq!(json_str, format!("\"{}\"", P2PKH_HEX));
        let back: Script = serde_json::from_str(&json_str).unwrap();
        assert_eq!(back, script);
    }

    #[test]
    fn test_display_and_debug() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(format!("{}", script), P2PKH_HEX);
        assert!(format!("{:?}", script).starts_with("Script(76a914"));
    }
}
