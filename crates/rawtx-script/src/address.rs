/// P2PKH address handling.
///
/// Base58Check addresses carry a version byte that selects the network,
/// the 20-byte public key hash, and a four-byte checksum.

use std::fmt;
use std::str::FromStr;

use rawtx_primitives::hash::{checksum, hash160, CHECKSUM_SIZE};

use crate::ScriptError;

/// Mainnet P2PKH address version byte.
const MAINNET_P2PKH: u8 = 0x00;
/// Testnet P2PKH address version byte.
const TESTNET_P2PKH: u8 = 0x6f;

/// Decoded length: version + hash + checksum.
const ADDRESS_LEN: usize = 1 + 20 + CHECKSUM_SIZE;

/// Network an address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Prefix 0x00, addresses start with '1'.
    Mainnet,
    /// Prefix 0x6f, addresses start with 'm' or 'n'.
    Testnet,
}

impl Network {
    fn version_byte(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH,
            Network::Testnet => TESTNET_P2PKH,
        }
    }
}

/// A P2PKH address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The Base58Check address string.
    pub address_string: String,
    /// The 20-byte RIPEMD-160(SHA-256(pubkey)) hash.
    pub public_key_hash: [u8; 20],
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check-encoded address string.
    ///
    /// The network is detected from the version byte.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let decoded = bs58::decode(addr)
            .into_vec()
            .map_err(|_| ScriptError::InvalidAddress(format!("bad char for '{}'", addr)))?;

        if decoded.len() != ADDRESS_LEN {
            return Err(ScriptError::InvalidAddressLength(addr.to_string()));
        }

        if decoded[21..] != checksum(&decoded[..21]) {
            return Err(ScriptError::EncodingChecksumFailed);
        }

        let network = match decoded[0] {
            MAINNET_P2PKH => Network::Mainnet,
            TESTNET_P2PKH => Network::Testnet,
            _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
        };

        let mut pkh = [0u8; 20];
        pkh.copy_from_slice(&decoded[1..21]);

        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash: pkh,
            network,
        })
    }

    /// Encode a 20-byte public key hash for the given network.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        let mut payload = Vec::with_capacity(ADDRESS_LEN);
        payload.push(network.version_byte());
        payload.extend_from_slice(hash);
        let check = checksum(&payload);
        payload.extend_from_slice(&check);

        Address {
            address_string: bs58::encode(&payload).into_string(),
            public_key_hash: *hash,
            network,
        }
    }

    /// Address of a SEC1-encoded public key, hashed exactly as given.
    ///
    /// Compressed and uncompressed encodings of the same point yield
    /// different addresses.
    pub fn from_public_key_bytes(pub_key: &[u8], network: Network) -> Self {
        Self::from_public_key_hash(&hash160(pub_key), network)
    }

    /// Address of a hex-encoded public key.
    pub fn from_public_key_string(
        pub_key_hex: &str,
        network: Network,
    ) -> Result<Self, ScriptError> {
        let pub_key_bytes =
            hex::decode(pub_key_hex).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Self::from_public_key_bytes(&pub_key_bytes, network))
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}
