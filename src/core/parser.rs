//! # Parser
//!
//! Incremental decoder turning an arbitrarily chunked byte stream into
//! validated messages.
//!
//! The parser alternates between two phases. While awaiting a header it
//! needs exactly [`HEADER_SIZE`] bytes; once a header validates it needs
//! exactly the declared payload size. Chunks are queued as they arrive and
//! only sliced into a contiguous block once a whole header or payload is
//! available, so a chunk that already holds a full unit is never copied.
//!
//! ## Recovery
//! Every rejected frame leaves the parser awaiting a header again, and the
//! error is returned in stream order next to the decoded packets. After an
//! invalid magic value the [`ResyncPolicy`] decides where the next header
//! starts.
//!
//! ```rust
//! use peer_wire::{Framer, Network, Parser, RawCodec};
//!
//! let profile = Network::Regtest.profile();
//! let wire = Framer::new(profile).packet("ping", &[0u8; 8], None).unwrap();
//!
//! let mut parser = Parser::new(profile, RawCodec);
//! assert!(parser.feed(wire.slice(..10)).is_empty());
//! let out = parser.feed(wire.slice(10..));
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].as_ref().unwrap().command, "ping");
//! ```

use crate::config::{NetworkProfile, ResyncPolicy, WireConfig};
use crate::core::codec::PacketCodec;
use crate::core::header::{Header, HEADER_SIZE};
use crate::error::{ProtocolError, Result};
use crate::utils::digest;
use crate::utils::metrics::{self, Metrics};
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Stateful stream decoder for one connection
#[derive(Debug)]
pub struct Parser<C: PacketCodec> {
    profile: NetworkProfile,
    codec: C,
    resync: ResyncPolicy,
    metrics: Option<Arc<Metrics>>,
    chunks: VecDeque<Bytes>,
    // Always the sum of `chunks` lengths
    buffered: usize,
    awaiting: usize,
    header: Option<Header>,
}

impl<C: PacketCodec> Parser<C> {
    pub fn new(profile: NetworkProfile, codec: C) -> Self {
        Self {
            profile,
            codec,
            resync: ResyncPolicy::default(),
            metrics: None,
            chunks: VecDeque::new(),
            buffered: 0,
            awaiting: HEADER_SIZE,
            header: None,
        }
    }

    /// Build a parser with the profile, resync policy and metrics choice of `config`
    pub fn from_config(config: &WireConfig, codec: C) -> Self {
        let parser = Self::new(config.profile(), codec).with_resync(config.parser.resync);
        if config.parser.collect_metrics {
            parser.with_metrics(metrics::global_metrics())
        } else {
            parser
        }
    }

    pub fn with_resync(mut self, resync: ResyncPolicy) -> Self {
        self.resync = resync;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Buffer `chunk` and decode every message it completes.
    ///
    /// Results come back in stream order. Bytes of an incomplete message stay
    /// buffered for the next call.
    pub fn feed(&mut self, chunk: impl Into<Bytes>) -> Vec<Result<C::Packet>> {
        let mut out = Vec::new();
        self.feed_with(chunk, |result| out.push(result));
        out
    }

    /// Like [`feed`](Self::feed), handing each result to `sink` as it is produced
    pub fn feed_with<F>(&mut self, chunk: impl Into<Bytes>, mut sink: F)
    where
        F: FnMut(Result<C::Packet>),
    {
        let chunk = chunk.into();
        if !chunk.is_empty() {
            if let Some(metrics) = &self.metrics {
                metrics.bytes_received(chunk.len() as u64);
            }
            self.buffered += chunk.len();
            self.chunks.push_back(chunk);
        }

        trace!(
            buffered = self.buffered,
            awaiting = self.awaiting,
            "Buffered chunk"
        );

        while self.buffered >= self.awaiting {
            let block = self.take(self.awaiting);
            if let Some(result) = self.process(block) {
                sink(result);
            }
        }
    }

    /// Drop buffered bytes and any pending header
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.buffered = 0;
        self.awaiting = HEADER_SIZE;
        self.header = None;
    }

    /// Bytes received but not yet consumed
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Bytes needed to complete the current header or payload
    pub fn awaiting(&self) -> usize {
        self.awaiting
    }

    pub fn is_awaiting_header(&self) -> bool {
        self.header.is_none()
    }

    /// Header whose payload is still being collected
    pub fn current_header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn resync_policy(&self) -> ResyncPolicy {
        self.resync
    }

    /// Remove exactly `n` bytes from the front of the queue. Caller guarantees
    /// `n <= self.buffered`.
    fn take(&mut self, n: usize) -> Bytes {
        self.buffered -= n;
        if n == 0 {
            return Bytes::new();
        }

        if let Some(front) = self.chunks.front_mut() {
            if front.len() > n {
                return front.split_to(n);
            }
            if front.len() == n {
                return self.chunks.pop_front().unwrap_or_default();
            }
        }

        let mut block = BytesMut::with_capacity(n);
        while block.len() < n {
            let Some(mut front) = self.chunks.pop_front() else {
                break;
            };
            let need = n - block.len();
            if front.len() > need {
                block.extend_from_slice(&front.split_to(need));
                self.chunks.push_front(front);
            } else {
                block.extend_from_slice(&front);
            }
        }
        block.freeze()
    }

    fn process(&mut self, block: Bytes) -> Option<Result<C::Packet>> {
        self.awaiting = HEADER_SIZE;
        match self.header.take() {
            None => self.process_header(block).err().map(Err),
            Some(header) => Some(self.process_payload(header, block)),
        }
    }

    fn process_header(&mut self, block: Bytes) -> Result<()> {
        match Header::decode(&block, &self.profile) {
            Ok(header) => {
                trace!(
                    command = header.command(),
                    payload_size = header.payload_size(),
                    "Header accepted"
                );
                self.awaiting = header.payload_size() as usize;
                self.header = Some(header);
                Ok(())
            }
            Err(err) => {
                if matches!(err, ProtocolError::InvalidMagic { .. })
                    && self.resync == ResyncPolicy::ScanForMagic
                {
                    self.rewind_to_magic(block);
                }
                Err(self.reject(err))
            }
        }
    }

    fn process_payload(&mut self, header: Header, block: Bytes) -> Result<C::Packet> {
        let actual = digest::checksum(&block);
        if actual != header.checksum() {
            return Err(self.reject(ProtocolError::ChecksumMismatch {
                expected: header.checksum(),
                actual,
            }));
        }

        let size = block.len();
        match self.codec.decode(header.command(), block) {
            Ok(packet) => {
                debug!(command = header.command(), size, "Decoded message");
                if let Some(metrics) = &self.metrics {
                    metrics.message_decoded();
                }
                Ok(packet)
            }
            Err(source) => Err(self.reject(ProtocolError::PayloadDecode {
                command: header.into_command(),
                source: source.into(),
            })),
        }
    }

    /// Put back the part of a rejected header that could start the next
    /// magic value. The first byte is always consumed.
    fn rewind_to_magic(&mut self, block: Bytes) {
        let magic = self.profile.magic().to_le_bytes();
        let start = (1..block.len()).find(|&i| {
            let tail = &block[i..];
            let k = tail.len().min(magic.len());
            tail[..k] == magic[..k]
        });

        if let Some(start) = start {
            let rest = block.slice(start..);
            trace!(skipped = start, kept = rest.len(), "Rewinding to magic candidate");
            self.buffered += rest.len();
            self.chunks.push_front(rest);
        }
    }

    fn reject(&self, err: ProtocolError) -> ProtocolError {
        warn!(error = %err, "Rejected frame");
        if let Some(metrics) = &self.metrics {
            metrics.frame_rejected(&err);
        }
        err
    }
}
