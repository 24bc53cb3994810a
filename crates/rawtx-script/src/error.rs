/// Error types for script operations.
///
/// Covers parsing errors, push encoding limits, and address validation.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Attempted to append a push opcode through `append_opcodes`.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// A public key hash was not exactly 20 bytes.
    #[error("invalid public key hash length: expected 20 bytes, got {0}")]
    InvalidHashLength(usize),

    /// A payload cannot be expressed as a single direct push.
    #[error("push of {len} bytes exceeds direct push limit of {max}")]
    PushTooLarge { len: usize, max: usize },

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid address length after Base58 decoding.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// Address version byte is not P2PKH mainnet or testnet.
    #[error("address not supported {0}")]
    UnsupportedAddress(String),

    /// Base58Check checksum does not match.
    #[error("checksum failed")]
    EncodingChecksumFailed,

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Script is empty when a non-empty script was expected.
    #[error("script is empty")]
    EmptyScript,

    /// Script is not a P2PKH script.
    #[error("not a P2PKH")]
    NotP2PKH,

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] rawtx_primitives::PrimitivesError),
}
