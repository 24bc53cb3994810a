/// Raw transaction primitives - hashing, chain hashes, and secp256k1 keys.
///
/// This crate provides the building blocks the transaction builder and the
/// peer-to-peer broadcaster share:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160) and the
///   four-byte message checksum
/// - Chain hash type for transaction identification (byte-reversed display)
/// - Variable-length integer encoding and little-endian byte reader/writer
/// - secp256k1 private keys, public keys, and DER ECDSA signatures

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod ec;

mod error;
pub use error::PrimitivesError;
