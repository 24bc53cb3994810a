/// Peer-to-peer relay for raw transactions.
///
/// Frames payloads in the network message envelope, performs the `version`
/// handshake, and sends `tx` messages to configured peers.

pub mod broadcaster;
pub mod config;
pub mod message;
pub mod network;
pub mod version;

mod error;
pub use broadcaster::{BroadcastSuccess, Broadcaster, PeerBroadcaster};
pub use config::{BroadcastConfig, HandshakePolicy};
pub use error::P2pError;
pub use message::{Command, Message, MessageHeader};
pub use network::Network;
pub use version::VersionMessage;
