//! Network selection: envelope magic and default ports.

use serde::{Deserialize, Serialize};

use crate::P2pError;

const MAGIC_MAINNET: u32 = 0xD9B4BEF9;
const MAGIC_TESTNET: u32 = 0x0709110B;

/// Network a message envelope belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Magic value, written little-endian at the start of every envelope.
    pub fn magic(&self) -> u32 {
        match *self {
            Network::Mainnet => MAGIC_MAINNET,
            Network::Testnet => MAGIC_TESTNET,
        }
    }

    pub fn from_magic(magic: u32) -> Result<Self, P2pError> {
        match magic {
            MAGIC_MAINNET => Ok(Network::Mainnet),
            MAGIC_TESTNET => Ok(Network::Testnet),
            _ => Err(P2pError::InvalidMagic {
                expected: MAGIC_MAINNET,
                got: magic,
            }),
        }
    }

    pub fn port(&self) -> u16 {
        match *self {
            Network::Mainnet => 8333,
            Network::Testnet => 18333,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}
