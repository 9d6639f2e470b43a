//! # Header
//!
//! The fixed 24-byte preamble in front of every payload.
//!
//! ```text
//! [Magic(4, LE)] [Command(12, NUL padded)] [Length(4, LE)] [Checksum(4, LE)]
//! ```
//!
//! Decoding validates everything that can be checked without the payload:
//! the magic value, a NUL-terminated ASCII command, and the declared length
//! against the profile's limit.

use crate::config::NetworkProfile;
use crate::error::{ProtocolError, Result};

/// Total size of the fixed-length header
pub const HEADER_SIZE: usize = 24;

/// Width of the command field
pub const COMMAND_SIZE: usize = 12;

const COMMAND_OFFSET: usize = 4;
const LENGTH_OFFSET: usize = COMMAND_OFFSET + COMMAND_SIZE;
const CHECKSUM_OFFSET: usize = LENGTH_OFFSET + 4;

/// A validated message header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    command: String,
    payload_size: u32,
    checksum: u32,
}

impl Header {
    pub fn new(command: impl Into<String>, payload_size: u32, checksum: u32) -> Self {
        Self {
            command: command.into(),
            payload_size,
            checksum,
        }
    }

    /// Parse and validate a 24-byte header against `profile`.
    ///
    /// Checks run in wire order, so a header with both a bad magic value and
    /// an oversized length reports [`ProtocolError::InvalidMagic`]. A buffer
    /// shorter than [`HEADER_SIZE`] cannot hold a command and is reported as
    /// [`ProtocolError::MalformedCommand`].
    pub fn decode(buf: &[u8], profile: &NetworkProfile) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(ProtocolError::MalformedCommand);
        }

        let magic = read_u32_le(buf, 0);
        if magic != profile.magic() {
            return Err(ProtocolError::InvalidMagic {
                expected: profile.magic(),
                actual: magic,
            });
        }

        let field = &buf[COMMAND_OFFSET..LENGTH_OFFSET];
        let end = field
            .iter()
            .position(|&b| b == 0)
            .ok_or(ProtocolError::MalformedCommand)?;
        let name = &field[..end];
        if !name.is_ascii() {
            return Err(ProtocolError::MalformedCommand);
        }
        // ASCII is valid UTF-8
        let command = String::from_utf8_lossy(name).into_owned();

        let payload_size = read_u32_le(buf, LENGTH_OFFSET);
        if payload_size > profile.max_message_size() {
            return Err(ProtocolError::OversizedMessage {
                size: payload_size as usize,
                max: profile.max_message_size(),
            });
        }

        let checksum = read_u32_le(buf, CHECKSUM_OFFSET);

        Ok(Self {
            command,
            payload_size,
            checksum,
        })
    }

    /// Command name without padding
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Declared payload length in bytes
    pub fn payload_size(&self) -> u32 {
        self.payload_size
    }

    /// Checksum the payload must match
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn into_command(self) -> String {
        self.command
    }
}

#[inline]
fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: NetworkProfile = NetworkProfile::new(0xd9b4_bef9, 1_000);

    fn raw_header(magic: u32, command: &[u8; 12], len: u32, checksum: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.extend_from_slice(&magic.to_le_bytes());
        buf.extend_from_slice(command);
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    #[test]
    fn test_decode_fields() {
        let buf = raw_header(0xd9b4_bef9, b"ping\0\0\0\0\0\0\0\0", 8, 0xdead_beef);
        let header = Header::decode(&buf, &PROFILE).expect("valid header");
        assert_eq!(header.command(), "ping");
        assert_eq!(header.payload_size(), 8);
        assert_eq!(header.checksum(), 0xdead_beef);
    }

    #[test]
    fn test_magic_checked_first() {
        let buf = raw_header(0x0709_110b, b"ping\0\0\0\0\0\0\0\0", 5_000, 0);
        assert!(matches!(
            Header::decode(&buf, &PROFILE),
            Err(ProtocolError::InvalidMagic {
                expected: 0xd9b4_bef9,
                actual: 0x0709_110b
            })
        ));
    }

    #[test]
    fn test_unterminated_command() {
        let buf = raw_header(0xd9b4_bef9, b"abcdefghijkl", 0, 0);
        assert!(matches!(
            Header::decode(&buf, &PROFILE),
            Err(ProtocolError::MalformedCommand)
        ));
    }

    #[test]
    fn test_non_ascii_command() {
        let buf = raw_header(0xd9b4_bef9, b"p\xffng\0\0\0\0\0\0\0\0", 0, 0);
        assert!(matches!(
            Header::decode(&buf, &PROFILE),
            Err(ProtocolError::MalformedCommand)
        ));
    }

    #[test]
    fn test_eleven_byte_command() {
        let buf = raw_header(0xd9b4_bef9, b"sendheaders\0", 0, 0);
        let header = Header::decode(&buf, &PROFILE).expect("valid header");
        assert_eq!(header.command(), "sendheaders");
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let at_limit = raw_header(0xd9b4_bef9, b"block\0\0\0\0\0\0\0", 1_000, 0);
        assert!(Header::decode(&at_limit, &PROFILE).is_ok());

        let over = raw_header(0xd9b4_bef9, b"block\0\0\0\0\0\0\0", 1_001, 0);
        assert!(matches!(
            Header::decode(&over, &PROFILE),
            Err(ProtocolError::OversizedMessage {
                size: 1_001,
                max: 1_000
            })
        ));
    }
}
