use std::net::SocketAddr;

/// Error types for peer-to-peer framing and broadcast.
#[derive(Debug, thiserror::Error)]
pub enum P2pError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid magic: expected {expected:#010x}, got {got:#010x}")]
    InvalidMagic { expected: u32, got: u32 },

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("payload checksum mismatch")]
    ChecksumMismatch,

    #[error("payload of {0} bytes exceeds the message size limit")]
    PayloadTooLarge(usize),

    #[error("malformed {command} message: {reason}")]
    MalformedMessage { command: String, reason: String },

    #[error("expected {expected} message, got {got}")]
    UnexpectedMessage { expected: String, got: String },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no peers to broadcast to")]
    NoPeers,

    #[error("peer {peer} failed: {reason}")]
    PeerFailed { peer: SocketAddr, reason: String },

    #[error("all {attempts} peers failed")]
    AllPeersFailed { attempts: usize },

    #[error("primitives error: {0}")]
    Primitives(#[from] rawtx_primitives::PrimitivesError),
}
