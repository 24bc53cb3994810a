//! Broadcast configuration, loadable from JSON.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::network::Network;
use crate::P2pError;

/// How much of the handshake to complete before sending the transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakePolicy {
    /// Wait for the peer's `version` and `verack` and answer with `verack`.
    #[default]
    Verify,
    /// Send `version` then `tx` without reading anything back.
    SendOnly,
}

/// Settings for [`crate::PeerBroadcaster`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BroadcastConfig {
    pub network: Network,
    pub peers: Vec<SocketAddr>,
    /// Host resolved for extra peers on the network's default port.
    pub dns_seed: Option<String>,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Peers tried before giving up. 0 means every known peer.
    pub max_peers: usize,
    pub backoff_ms: u64,
    pub handshake: HandshakePolicy,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        BroadcastConfig {
            network: Network::Mainnet,
            peers: Vec::new(),
            dns_seed: None,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 10_000,
            max_peers: 8,
            backoff_ms: 250,
            handshake: HandshakePolicy::Verify,
        }
    }
}

impl BroadcastConfig {
    pub fn from_json_str(json: &str) -> Result<Self, P2pError> {
        let config: BroadcastConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, P2pError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), P2pError> {
        if self.peers.is_empty() && self.dns_seed.is_none() {
            return Err(P2pError::Config(
                "at least one peer or a dns_seed is required".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(P2pError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_with_defaults() {
        let config = BroadcastConfig::from_json_str(
            r#"{"network": "testnet", "peers": ["127.0.0.1:18333"], "handshake": "send_only"}"#,
        )
        .unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.peers, vec!["127.0.0.1:18333".parse().unwrap()]);
        assert_eq!(config.handshake, HandshakePolicy::SendOnly);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_peers, 8);
    }

    #[test]
    fn test_requires_a_peer_source() {
        assert!(matches!(
            BroadcastConfig::from_json_str("{}"),
            Err(P2pError::Config(_))
        ));
        assert!(BroadcastConfig::from_json_str(r#"{"dns_seed": "seed.example.org"}"#).is_ok());
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            BroadcastConfig::from_json_str(r#"{"peers": ["not an address"]}"#),
            Err(P2pError::Json(_))
        ));
        assert!(matches!(
            BroadcastConfig::from_json_str(r#"{"peers": [], "colour": 1}"#),
            Err(P2pError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        assert!(BroadcastConfig::from_json_str(
            r#"{"peers": ["127.0.0.1:8333"], "read_timeout_ms": 0}"#
        )
        .is_err());
    }
}
