//! Message envelope: header framing and payload checksum.
//!
//! # Wire format
//!
//! | Field    | Size                         |
//! |----------|------------------------------|
//! | magic    | 4 bytes (LE)                 |
//! | command  | 12 bytes, NUL padded ASCII   |
//! | length   | 4 bytes (LE)                 |
//! | checksum | first 4 bytes of SHA-256d    |
//! | payload  | `length` bytes               |

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use rawtx_primitives::hash::{checksum, CHECKSUM_SIZE};

use crate::network::Network;
use crate::P2pError;

/// Size of a serialized [`MessageHeader`].
pub const HEADER_SIZE: usize = 24;

/// Length of the command field.
pub const COMMAND_SIZE: usize = 12;

/// Largest payload accepted from a peer.
pub const MAX_PAYLOAD_SIZE: usize = 0x0200_0000;

/// A NUL-padded ASCII command name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command([u8; COMMAND_SIZE]);

impl Command {
    pub fn as_bytes(&self) -> &[u8; COMMAND_SIZE] {
        &self.0
    }

    /// Length without the NUL padding.
    pub fn len(&self) -> usize {
        let padding = self.0.iter().rev().take_while(|&&b| b == 0).count();
        COMMAND_SIZE - padding
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn from_wire(bytes: [u8; COMMAND_SIZE]) -> Result<Self, P2pError> {
        let command = Command(bytes);
        let name = &bytes[..command.len()];
        if !name.iter().all(|b| b.is_ascii_graphic()) {
            return Err(P2pError::InvalidCommand(hex::encode(bytes)));
        }
        Ok(command)
    }
}

impl FromStr for Command {
    type Err = P2pError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > COMMAND_SIZE || !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(P2pError::InvalidCommand(s.to_string()));
        }
        let mut bytes = [0u8; COMMAND_SIZE];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(Command(bytes))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0[..self.len()]))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({})", self)
    }
}

impl PartialEq<&str> for Command {
    fn eq(&self, other: &&str) -> bool {
        &self.0[..self.len()] == other.as_bytes()
    }
}

/// The fixed 24-byte envelope header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    pub magic: u32,
    pub command: Command,
    pub length: u32,
    pub checksum: [u8; CHECKSUM_SIZE],
}

impl MessageHeader {
    /// Header for `payload` on `network`.
    pub fn for_payload(
        network: Network,
        command: Command,
        payload: &[u8],
    ) -> Result<Self, P2pError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(P2pError::PayloadTooLarge(payload.len()));
        }
        Ok(MessageHeader {
            magic: network.magic(),
            command,
            length: payload.len() as u32,
            checksum: checksum(payload),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..16].copy_from_slice(self.command.as_bytes());
        out[16..20].copy_from_slice(&self.length.to_le_bytes());
        out[20..24].copy_from_slice(&self.checksum);
        out
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Result<Self, P2pError> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        let mut command = [0u8; COMMAND_SIZE];
        command.copy_from_slice(&bytes[4..16]);
        let mut length = [0u8; 4];
        length.copy_from_slice(&bytes[16..20]);
        let mut sum = [0u8; CHECKSUM_SIZE];
        sum.copy_from_slice(&bytes[20..24]);

        Ok(MessageHeader {
            magic: u32::from_le_bytes(magic),
            command: Command::from_wire(command)?,
            length: u32::from_le_bytes(length),
            checksum: sum,
        })
    }
}

/// A framed message: header plus payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    header: MessageHeader,
    payload: Vec<u8>,
}

impl Message {
    /// Frame `payload` under `command` for `network`.
    ///
    /// # Returns
    /// `P2pError::InvalidCommand` for a command that is empty, not ASCII or
    /// longer than 12 bytes; `P2pError::PayloadTooLarge` past
    /// [`MAX_PAYLOAD_SIZE`].
    pub fn new(network: Network, command: &str, payload: Vec<u8>) -> Result<Self, P2pError> {
        let header = MessageHeader::for_payload(network, command.parse()?, &payload)?;
        Ok(Message { header, payload })
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn command(&self) -> Command {
        self.header.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), P2pError> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Read one message, checking magic, size limit and checksum.
    pub fn read_from<R: Read>(reader: &mut R, network: Network) -> Result<Self, P2pError> {
        let mut raw = [0u8; HEADER_SIZE];
        reader.read_exact(&mut raw)?;
        let header = MessageHeader::from_bytes(&raw)?;

        if header.magic != network.magic() {
            return Err(P2pError::InvalidMagic {
                expected: network.magic(),
                got: header.magic,
            });
        }
        let length = header.length as usize;
        if length > MAX_PAYLOAD_SIZE {
            return Err(P2pError::PayloadTooLarge(length));
        }

        let mut payload = vec![0u8; length];
        reader.read_exact(&mut payload)?;
        if checksum(&payload) != header.checksum {
            return Err(P2pError::ChecksumMismatch);
        }

        Ok(Message { header, payload })
    }
}
