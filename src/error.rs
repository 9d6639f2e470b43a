//! # Error Types
//!
//! Error handling for the framing layer.
//!
//! Every way a frame can be rejected has its own variant, so callers can tell
//! a corrupted payload from a peer speaking for the wrong network without
//! matching on strings.
//!
//! ## Error Categories
//! - **Header errors**: invalid magic, malformed command, oversized length
//! - **Payload errors**: checksum mismatch, payload rejected by the codec
//! - **Framer errors**: command name too long or not plain ASCII
//! - **Ambient errors**: I/O on a wrapped stream, configuration problems
//!
//! None of the framing errors are fatal to a [`Parser`](crate::core::parser::Parser);
//! they are reported as values and the parser keeps consuming the stream.
//!
//! ## Example Usage
//! ```rust
//! use peer_wire::error::ProtocolError;
//! use tracing::warn;
//!
//! fn report(err: &ProtocolError) {
//!     if err.is_framing() {
//!         warn!(error = %err, "Dropping malformed frame");
//!     }
//! }
//! ```

use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Boxed cause carried by [`ProtocolError::PayloadDecode`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// ProtocolError is the primary error type for all framing operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid magic value: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    #[error("Malformed command: not a NUL-terminated ASCII name")]
    MalformedCommand,

    #[error("Message too large: {size} bytes (max {max})")]
    OversizedMessage { size: usize, max: u32 },

    #[error("Checksum mismatch: header {expected:#010x}, payload {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Failed to decode `{command}` payload: {source}")]
    PayloadDecode {
        command: String,
        #[source]
        source: BoxError,
    },

    #[error("Command too long: {0} bytes (max 12)")]
    CommandTooLong(usize),

    #[error("Invalid command name: {0:?}")]
    InvalidCommand(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// True for errors describing a single bad frame on the wire.
    ///
    /// These are the errors a [`Parser`](crate::core::parser::Parser) recovers
    /// from on its own; the rest come from the surrounding plumbing.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidMagic { .. }
                | ProtocolError::MalformedCommand
                | ProtocolError::OversizedMessage { .. }
                | ProtocolError::ChecksumMismatch { .. }
                | ProtocolError::PayloadDecode { .. }
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_decode_keeps_source() {
        let err = ProtocolError::PayloadDecode {
            command: "version".to_string(),
            source: "truncated nonce".into(),
        };

        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("truncated nonce"));
        assert!(err.to_string().contains("`version`"));
    }

    #[test]
    fn test_framing_classification() {
        assert!(ProtocolError::MalformedCommand.is_framing());
        assert!(ProtocolError::InvalidMagic {
            expected: 1,
            actual: 2
        }
        .is_framing());
        assert!(!ProtocolError::CommandTooLong(13).is_framing());
        assert!(!ProtocolError::ConfigError("bad".into()).is_framing());
    }

    #[test]
    fn test_magic_display_is_hex() {
        let err = ProtocolError::InvalidMagic {
            expected: 0xd9b4bef9,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid magic value: expected 0xd9b4bef9, got 0x00000000"
        );
    }
}
