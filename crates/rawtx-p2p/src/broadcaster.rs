//! Transaction relay to network peers.

use std::collections::HashSet;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::seq::SliceRandom;
use rawtx_primitives::chainhash::{double_hash_h, Hash};
use tracing::{debug, info, warn};

use crate::config::{BroadcastConfig, HandshakePolicy};
use crate::message::Message;
use crate::version::VersionMessage;
use crate::P2pError;

/// Messages read while waiting for the handshake before giving up.
const MAX_HANDSHAKE_MESSAGES: usize = 16;

/// Result of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSuccess {
    /// Peer that accepted the `tx` message.
    pub peer: SocketAddr,
    pub txid: Hash,
}

/// Trait for broadcasting serialized transactions to the network.
pub trait Broadcaster {
    fn broadcast(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, P2pError>;
}

/// Relays a transaction to the first peer that takes it.
///
/// Peers are tried in random order. A peer that fails is logged and the next
/// one is tried after the configured backoff.
#[derive(Debug, Clone)]
pub struct PeerBroadcaster {
    config: BroadcastConfig,
}

impl PeerBroadcaster {
    pub fn new(config: BroadcastConfig) -> Result<Self, P2pError> {
        config.validate()?;
        Ok(PeerBroadcaster { config })
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Configured peers plus any resolved from the DNS seed, shuffled and
    /// truncated to `max_peers`.
    pub fn candidate_peers(&self) -> Vec<SocketAddr> {
        let mut seen = HashSet::new();
        let mut peers: Vec<SocketAddr> = self
            .config
            .peers
            .iter()
            .copied()
            .filter(|p| seen.insert(*p))
            .collect();

        if let Some(seed) = &self.config.dns_seed {
            match (seed.as_str(), self.config.network.port()).to_socket_addrs() {
                Ok(addrs) => {
                    let before = peers.len();
                    peers.extend(addrs.filter(|p| seen.insert(*p)));
                    debug!(seed = %seed, resolved = peers.len() - before, "resolved dns seed");
                }
                Err(e) => warn!(seed = %seed, error = %e, "dns seed lookup failed"),
            }
        }

        peers.shuffle(&mut rand::thread_rng());
        if self.config.max_peers > 0 {
            peers.truncate(self.config.max_peers);
        }
        peers
    }

    /// Relay `raw_tx` to `peer` alone.
    ///
    /// Any failure on the connection is returned as `P2pError::PeerFailed`.
    pub fn relay_to(&self, peer: SocketAddr, raw_tx: &[u8]) -> Result<(), P2pError> {
        let tx_message = Message::new(self.config.network, "tx", raw_tx.to_vec())?;
        self.try_peer(peer, &tx_message)
    }

    fn try_peer(&self, peer: SocketAddr, tx_message: &Message) -> Result<(), P2pError> {
        self.send_to_peer(peer, tx_message).map_err(|e| P2pError::PeerFailed {
            peer,
            reason: e.to_string(),
        })
    }

    fn send_to_peer(&self, peer: SocketAddr, tx_message: &Message) -> Result<(), P2pError> {
        let network = self.config.network;
        let mut stream = TcpStream::connect_timeout(&peer, self.config.connect_timeout())?;
        stream.set_read_timeout(Some(self.config.read_timeout()))?;
        stream.set_write_timeout(Some(self.config.read_timeout()))?;
        stream.set_nodelay(true)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let version = VersionMessage::new(peer, timestamp, rand::random());
        Message::new(network, "version", version.to_bytes())?.write_to(&mut stream)?;
        debug!(%peer, "sent version");

        if self.config.handshake == HandshakePolicy::Verify {
            let mut got_version = false;
            let mut got_verack = false;
            for _ in 0..MAX_HANDSHAKE_MESSAGES {
                let msg = Message::read_from(&mut stream, network)?;
                let command = msg.command();
                if command == "version" {
                    let theirs = VersionMessage::from_bytes(msg.payload())?;
                    debug!(
                        %peer,
                        version = theirs.version,
                        user_agent = %theirs.user_agent,
                        "peer version"
                    );
                    Message::new(network, "verack", Vec::new())?.write_to(&mut stream)?;
                    got_version = true;
                } else if command == "verack" {
                    got_verack = true;
                } else {
                    debug!(%peer, %command, "ignoring message during handshake");
                }
                if got_version && got_verack {
                    break;
                }
            }
            if !(got_version && got_verack) {
                return Err(P2pError::UnexpectedMessage {
                    expected: "version and verack".to_string(),
                    got: format!("{} other messages", MAX_HANDSHAKE_MESSAGES),
                });
            }
        }

        tx_message.write_to(&mut stream)?;
        Ok(())
    }
}

impl Broadcaster for PeerBroadcaster {
    fn broadcast(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, P2pError> {
        let txid = double_hash_h(raw_tx);
        let tx_message = Message::new(self.config.network, "tx", raw_tx.to_vec())?;

        let peers = self.candidate_peers();
        if peers.is_empty() {
            return Err(P2pError::NoPeers);
        }

        for (i, peer) in peers.iter().enumerate() {
            if i > 0 && !self.config.backoff().is_zero() {
                std::thread::sleep(self.config.backoff());
            }
            match self.try_peer(*peer, &tx_message) {
                Ok(()) => {
                    info!(%peer, %txid, "transaction relayed");
                    return Ok(BroadcastSuccess { peer: *peer, txid });
                }
                Err(e) => warn!(error = %e, "trying next peer"),
            }
        }

        Err(P2pError::AllPeersFailed {
            attempts: peers.len(),
        })
    }
}
