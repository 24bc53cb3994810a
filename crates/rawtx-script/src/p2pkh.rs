//! Pay-to-Public-Key-Hash script encoders.
//!
//! `lock` builds `OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG`
//! and `unlock_script` builds `<sig> <pubkey>` with direct pushes only.

use crate::opcodes::*;
use crate::{Address, Script, ScriptError};

/// Length of a P2PKH locking script in bytes.
pub const LOCKING_SCRIPT_LEN: usize = 25;

/// Length of the public key hash a P2PKH script commits to.
pub const PUBLIC_KEY_HASH_LEN: usize = 20;

/// Build a P2PKH locking script for a 20-byte public key hash.
///
/// # Returns
/// The 25-byte script, or `ScriptError::InvalidHashLength` if `hash` is
/// not exactly 20 bytes.
pub fn lock(hash: &[u8]) -> Result<Script, ScriptError> {
    if hash.len() != PUBLIC_KEY_HASH_LEN {
        return Err(ScriptError::InvalidHashLength(hash.len()));
    }

    let mut bytes = Vec::with_capacity(LOCKING_SCRIPT_LEN);
    bytes.push(OP_DUP);
    bytes.push(OP_HASH160);
    bytes.push(OP_DATA_20);
    bytes.extend_from_slice(hash);
    bytes.push(OP_EQUALVERIFY);
    bytes.push(OP_CHECKSIG);

    Ok(Script::from_bytes(&bytes))
}

/// Build a P2PKH locking script paying to an address.
pub fn lock_address(address: &Address) -> Script {
    let mut bytes = Vec::with_capacity(LOCKING_SCRIPT_LEN);
    bytes.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
    bytes.extend_from_slice(&address.public_key_hash);
    bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    Script::from_bytes(&bytes)
}

/// Build a P2PKH unlocking script from a signature (DER plus sighash byte)
/// and the public key bytes exactly as they hash to the locked value.
///
/// Both elements use a single-byte direct push.
///
/// # Returns
/// `ScriptError::PushTooLarge` if either element is empty or longer than
/// 75 bytes.
pub fn unlock_script(sig: &[u8], pub_key: &[u8]) -> Result<Script, ScriptError> {
    let mut script = Script::new();
    script.append_direct_push(sig)?;
    script.append_direct_push(pub_key)?;
    Ok(script)
}

/// Split a P2PKH unlocking script into its signature and public key pushes.
///
/// # Returns
/// `ScriptError::InvalidScript` unless the script is exactly two direct
/// pushes.
pub fn parse_unlock_script(script: &Script) -> Result<(Vec<u8>, Vec<u8>), ScriptError> {
    let mut chunks = script.chunks()?.into_iter();
    match (chunks.next(), chunks.next(), chunks.next()) {
        (Some(sig), Some(pub_key), None) if sig.is_direct_push() && pub_key.is_direct_push() => {
            match (sig.data, pub_key.data) {
                (Some(sig), Some(pub_key)) => Ok((sig, pub_key)),
                _ => Err(ScriptError::InvalidScript("missing push data".to_string())),
            }
        }
        _ => Err(ScriptError::InvalidScript(
            "P2PKH unlocking script must be two direct pushes".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Network;

    const HASH_HEX: &str = "e2a623699e81b291c0327f408fea765d534baa2a";

    #[test]
    fn test_lock_layout() {
        let hash = hex::decode(HASH_HEX).unwrap();
        let script = lock(&hash).unwrap();
        assert_eq!(script.len(), LOCKING_SCRIPT_LEN);
        assert_eq!(script.to_hex(), format!("76a914{}88ac", HASH_HEX));
        assert!(script.is_p2pkh());
        assert_eq!(&script.public_key_hash().unwrap()[..], &hash[..]);
    }

    #[test]
    fn test_lock_rejects_wrong_length() {
        assert!(matches!(lock(&[0u8; 19]), Err(ScriptError::InvalidHashLength(19))));
        assert!(matches!(lock(&[0u8; 21]), Err(ScriptError::InvalidHashLength(21))));
        assert!(matches!(lock(&[]), Err(ScriptError::InvalidHashLength(0))));
    }

    #[test]
    fn test_lock_address_matches_lock() {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&hex::decode(HASH_HEX).unwrap());
        let addr = Address::from_public_key_hash(&hash, Network::Testnet);
        assert_eq!(lock_address(&addr), lock(&hash).unwrap());
    }

    #[test]
    fn test_unlock_script_layout() {
        let sig = vec![0x30; 71];
        let pub_key = vec![0x02; 33];
        let script = unlock_script(&sig, &pub_key).unwrap();
        let bytes = script.to_bytes();
        assert_eq!(bytes.len(), 1 + 71 + 1 + 33);
        assert_eq!(bytes[0], 71);
        assert_eq!(bytes[72], 33);

        let (s, p) = parse_unlock_script(&script).unwrap();
        assert_eq!(s, sig);
        assert_eq!(p, pub_key);
    }

    #[test]
    fn test_unlock_script_accepts_uncompressed_key() {
        let script = unlock_script(&[0x30; 72], &[0x04; 65]).unwrap();
        assert_eq!(script.len(), 1 + 72 + 1 + 65);
    }

    #[test]
    fn test_unlock_script_push_overflow() {
        assert!(matches!(
            unlock_script(&[0x30; 76], &[0x02; 33]),
            Err(ScriptError::PushTooLarge { len: 76, max: 75 })
        ));
        assert!(matches!(
            unlock_script(&[0x30; 71], &[0x02; 80]),
            Err(ScriptError::PushTooLarge { len: 80, .. })
        ));
        assert!(unlock_script(&[], &[0x02; 33]).is_err());
    }

    #[test]
    fn test_parse_unlock_script_rejects_other_shapes() {
        let one_push = Script::from_bytes(&[0x01, 0xaa]);
        assert!(parse_unlock_script(&one_push).is_err());

        let mut pushdata = Script::new();
        pushdata.append_push_data(&[0x30; 80]).unwrap();
        pushdata.append_push_data(&[0x02; 33]).unwrap();
        assert!(parse_unlock_script(&pushdata).is_err());

        let three = Script::from_bytes(&[0x01, 0xaa, 0x01, 0xbb, 0x01, 0xcc]);
        assert!(parse_unlock_script(&three).is_err());
    }
}
