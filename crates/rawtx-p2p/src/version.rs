//! `version` handshake payload.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use rawtx_primitives::util::{ByteReader, ByteWriter};

use crate::P2pError;

/// Protocol version announced in the handshake.
pub const PROTOCOL_VERSION: i32 = 70001;

/// User agent announced in the handshake.
pub const USER_AGENT: &str = concat!("/rawtx:", env!("CARGO_PKG_VERSION"), "/");

/// Size of a serialized [`NetAddress`].
pub const NET_ADDRESS_SIZE: usize = 26;

/// Peer address as carried in a `version` message.
///
/// IPv4 addresses are stored IPv6-mapped. The port is big-endian on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetAddress {
    pub services: u64,
    pub ip: Ipv6Addr,
    pub port: u16,
}

impl NetAddress {
    pub fn new(services: u64, addr: SocketAddr) -> Self {
        let ip = match addr.ip() {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        };
        NetAddress {
            services,
            ip,
            port: addr.port(),
        }
    }

    /// The unspecified address `[::]:0`.
    pub fn unspecified() -> Self {
        NetAddress {
            services: 0,
            ip: Ipv6Addr::UNSPECIFIED,
            port: 0,
        }
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.services);
        writer.write_bytes(&self.ip.octets());
        writer.write_bytes(&self.port.to_be_bytes());
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, P2pError> {
        let services = reader.read_u64_le()?;
        let ip = Ipv6Addr::from(reader.read_array::<16>()?);
        let port = u16::from_be_bytes(reader.read_array::<2>()?);
        Ok(NetAddress { services, ip, port })
    }
}

/// The `version` message payload (protocol 70001 layout).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionMessage {
    pub version: i32,
    pub services: u64,
    pub timestamp: i64,
    pub receiver: NetAddress,
    pub sender: NetAddress,
    pub nonce: u64,
    pub user_agent: String,
    pub start_height: i32,
    pub relay: bool,
}

impl VersionMessage {
    /// Our announcement to `peer`: no services, start height 0, relay on.
    pub fn new(peer: SocketAddr, timestamp: i64, nonce: u64) -> Self {
        VersionMessage {
            version: PROTOCOL_VERSION,
            services: 0,
            timestamp,
            receiver: NetAddress::new(0, peer),
            sender: NetAddress::unspecified(),
            nonce,
            user_agent: USER_AGENT.to_string(),
            start_height: 0,
            relay: true,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(86 + self.user_agent.len());
        writer.write_u32_le(self.version as u32);
        writer.write_u64_le(self.services);
        writer.write_u64_le(self.timestamp as u64);
        self.receiver.write_to(&mut writer);
        self.sender.write_to(&mut writer);
        writer.write_u64_le(self.nonce);
        writer.write_var_bytes(self.user_agent.as_bytes());
        writer.write_u32_le(self.start_height as u32);
        writer.write_u8(self.relay as u8);
        writer.into_bytes()
    }

    /// Parse a `version` payload.
    ///
    /// Peers older than 70001 omit the relay flag; it then reads as `true`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, P2pError> {
        let mut reader = ByteReader::new(bytes);
        let malformed = |reason: String| P2pError::MalformedMessage {
            command: "version".to_string(),
            reason,
        };

        let version = reader.read_u32_le()? as i32;
        let services = reader.read_u64_le()?;
        let timestamp = reader.read_u64_le()? as i64;
        let receiver = NetAddress::read_from(&mut reader)?;
        let sender = NetAddress::read_from(&mut reader)?;
        let nonce = reader.read_u64_le()?;
        let user_agent = String::from_utf8(reader.read_var_bytes()?.to_vec())
            .map_err(|e| malformed(format!("user agent: {}", e)))?;
        let start_height = reader.read_u32_le()? as i32;
        let relay = if reader.remaining() > 0 {
            reader.read_u8()? != 0
        } else {
            true
        };

        Ok(VersionMessage {
            version,
            services,
            timestamp,
            receiver,
            sender,
            nonce,
            user_agent,
            start_height,
            relay,
        })
    }
}
