/// Raw transaction SDK - script construction and address handling.
///
/// Provides the Script type, opcode definitions, script chunk parsing,
/// P2PKH locking and unlocking script encoders, and Base58Check addresses.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;
pub mod p2pkh;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{Address, Network};
pub use chunk::ScriptChunk;
