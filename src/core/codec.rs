//! # Packet Codecs
//!
//! [`PacketCodec`] is the seam between framing and payload interpretation:
//! the parser validates a frame, then hands the command name and payload to
//! the codec to build a typed packet.
//!
//! [`WireCodec`] packages a [`Parser`] and a [`Framer`] as a
//! `tokio_util` codec so the framing layer plugs into `Framed` streams.
//! Rejected frames are yielded as `Err` items rather than stream errors, so a
//! single corrupt message does not end the stream.

use crate::config::NetworkProfile;
use crate::core::framer::Framer;
use crate::core::parser::Parser;
use crate::error::{BoxError, ProtocolError, Result};
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

/// Turns a validated command + payload into a packet
pub trait PacketCodec {
    type Packet;
    type Error: Into<BoxError>;

    fn decode(&self, command: &str, payload: Bytes)
        -> std::result::Result<Self::Packet, Self::Error>;
}

/// Codec that keeps the payload undecoded
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

/// A frame whose payload has not been interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub command: String,
    pub payload: Bytes,
}

impl PacketCodec for RawCodec {
    type Packet = RawPacket;
    type Error = Infallible;

    fn decode(&self, command: &str, payload: Bytes) -> std::result::Result<RawPacket, Infallible> {
        Ok(RawPacket {
            command: command.to_string(),
            payload,
        })
    }
}

/// Codec backed by a closure, see [`codec_fn`]
pub struct FnCodec<F, P, E> {
    f: F,
    _marker: PhantomData<fn() -> (P, E)>,
}

/// Use `f` as a packet codec
pub fn codec_fn<F, P, E>(f: F) -> FnCodec<F, P, E>
where
    F: Fn(&str, Bytes) -> std::result::Result<P, E>,
    E: Into<BoxError>,
{
    FnCodec {
        f,
        _marker: PhantomData,
    }
}

impl<F, P, E> PacketCodec for FnCodec<F, P, E>
where
    F: Fn(&str, Bytes) -> std::result::Result<P, E>,
    E: Into<BoxError>,
{
    type Packet = P;
    type Error = E;

    fn decode(&self, command: &str, payload: Bytes) -> std::result::Result<P, E> {
        (self.f)(command, payload)
    }
}

impl<F, P, E> fmt::Debug for FnCodec<F, P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

/// A message waiting to be framed by [`WireCodec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub command: String,
    pub payload: Bytes,
    /// Precomputed checksum; computed from the payload when `None`
    pub checksum: Option<u32>,
}

impl OutboundMessage {
    pub fn new(command: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            command: command.into(),
            payload: payload.into(),
            checksum: None,
        }
    }
}

/// `tokio_util` codec over a [`Parser`] and a [`Framer`]
pub struct WireCodec<C: PacketCodec> {
    parser: Parser<C>,
    framer: Framer,
    ready: VecDeque<Result<C::Packet>>,
}

impl<C: PacketCodec> WireCodec<C> {
    pub fn new(profile: NetworkProfile, codec: C) -> Self {
        Self::from_parts(Parser::new(profile, codec), Framer::new(profile))
    }

    pub fn from_parts(parser: Parser<C>, framer: Framer) -> Self {
        Self {
            parser,
            framer,
            ready: VecDeque::new(),
        }
    }

    pub fn parser(&self) -> &Parser<C> {
        &self.parser
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }
}

impl<C: PacketCodec + fmt::Debug> fmt::Debug for WireCodec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireCodec")
            .field("parser", &self.parser)
            .field("framer", &self.framer)
            .field("ready", &self.ready.len())
            .finish()
    }
}

impl<C: PacketCodec> Decoder for WireCodec<C> {
    type Item = Result<C::Packet>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() {
            let chunk = src.split().freeze();
            let ready = &mut self.ready;
            self.parser.feed_with(chunk, |result| ready.push_back(result));
        }
        Ok(self.ready.pop_front())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let item = self.decode(src)?;
        if item.is_none() && self.parser.buffered() > 0 {
            debug!(
                buffered = self.parser.buffered(),
                "Stream ended inside a frame, discarding partial message"
            );
            self.parser.reset();
        }
        Ok(item)
    }
}

impl<C: PacketCodec> Encoder<OutboundMessage> for WireCodec<C> {
    type Error = ProtocolError;

    fn encode(&mut self, item: OutboundMessage, dst: &mut BytesMut) -> Result<()> {
        self.framer
            .packet_into(&item.command, &item.payload, item.checksum, dst)
    }
}
