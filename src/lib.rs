//! # peer-wire
//!
//! Message framing for peer-to-peer binary protocols with a 24-byte
//! magic/command/length/checksum header.
//!
//! - [`Parser`] consumes chunks of any size and yields decoded packets or
//!   structured errors, resynchronizing after every bad frame.
//! - [`Framer`] turns a command name and payload into wire bytes.
//! - [`WireCodec`] adapts both to `tokio_util::codec` for use with `Framed`.
//!
//! ```rust
//! use peer_wire::{Framer, Network, Parser, RawCodec};
//!
//! let profile = Network::Testnet.profile();
//! let framer = Framer::new(profile);
//! let mut parser = Parser::new(profile, RawCodec);
//!
//! let mut wire = framer.packet("verack", &[], None).unwrap().to_vec();
//! wire.extend_from_slice(&framer.packet("ping", &7u64.to_le_bytes(), None).unwrap());
//!
//! let commands: Vec<String> = parser
//!     .feed(wire)
//!     .into_iter()
//!     .map(|r| r.unwrap().command)
//!     .collect();
//! assert_eq!(commands, ["verack", "ping"]);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::{Network, NetworkProfile, ResyncPolicy, WireConfig, MAX_MESSAGE_SIZE};
pub use crate::core::codec::{
    codec_fn, FnCodec, OutboundMessage, PacketCodec, RawCodec, RawPacket, WireCodec,
};
pub use crate::core::framer::Framer;
pub use crate::core::header::{Header, COMMAND_SIZE, HEADER_SIZE};
pub use crate::core::parser::Parser;
pub use crate::error::{ProtocolError, Result};
