//! # Core Framing Components
//!
//! Header layout, incremental parsing, and message framing.
//!
//! ## Components
//! - **Header**: The 24-byte preamble and its validation
//! - **Parser**: Incremental decoder over arbitrarily chunked input
//! - **Framer**: Stateless encoder producing wire bytes
//! - **Codec**: Payload codec seam and the `tokio_util` adapter
//!
//! ## Wire Format
//! ```text
//! [Magic(4)] [Command(12)] [Length(4)] [Checksum(4)] [Payload(N)]
//! ```
//!
//! All integers are little-endian. The checksum is the first four bytes of
//! a double SHA-256 over the payload.
//!
//! ## Security
//! - Declared lengths are checked against the profile limit before any
//!   payload bytes are buffered for that message
//! - Magic values keep traffic from other networks out

pub mod codec;
pub mod framer;
pub mod header;
pub mod parser;
