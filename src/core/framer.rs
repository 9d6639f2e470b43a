//! # Framer
//!
//! Serializes a command name and an already encoded payload into the bytes a
//! peer expects: the 24-byte header followed by the payload verbatim.
//!
//! A framer holds no per-call state, so a single instance can be cloned or
//! shared across tasks freely.

use crate::config::NetworkProfile;
use crate::core::header::{COMMAND_SIZE, HEADER_SIZE};
use crate::error::{ProtocolError, Result};
use crate::utils::digest;
use crate::utils::metrics::Metrics;
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::Arc;
use tracing::trace;

/// Message encoder bound to one network profile
#[derive(Debug, Clone, Default)]
pub struct Framer {
    profile: NetworkProfile,
    metrics: Option<Arc<Metrics>>,
}

impl Framer {
    pub fn new(profile: NetworkProfile) -> Self {
        Self {
            profile,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    /// Frame `payload` under `command`.
    ///
    /// When `checksum` is `None` it is computed from the payload. A supplied
    /// checksum is written as-is, which lets callers reuse a digest they
    /// already have.
    ///
    /// # Errors
    /// - [`ProtocolError::CommandTooLong`] if `command` exceeds 12 bytes
    /// - [`ProtocolError::InvalidCommand`] if `command` holds NUL or non-ASCII bytes
    /// - [`ProtocolError::OversizedMessage`] if `payload` exceeds the profile limit
    pub fn packet(&self, command: &str, payload: &[u8], checksum: Option<u32>) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        self.packet_into(command, payload, checksum, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Append a framed message to `dst`. Nothing is written on error.
    pub fn packet_into(
        &self,
        command: &str,
        payload: &[u8],
        checksum: Option<u32>,
        dst: &mut BytesMut,
    ) -> Result<()> {
        validate_command(command)?;

        let max = self.profile.max_message_size();
        if payload.len() > max as usize {
            return Err(ProtocolError::OversizedMessage {
                size: payload.len(),
                max,
            });
        }

        let checksum = checksum.unwrap_or_else(|| digest::checksum(payload));
        let total = HEADER_SIZE + payload.len();

        dst.reserve(total);
        dst.put_u32_le(self.profile.magic());
        dst.put_slice(command.as_bytes());
        dst.put_bytes(0, COMMAND_SIZE - command.len());
        // Fits: bounded by max_message_size above
        dst.put_u32_le(payload.len() as u32);
        dst.put_u32_le(checksum);
        dst.put_slice(payload);

        trace!(command, payload_size = payload.len(), "Framed message");
        if let Some(metrics) = &self.metrics {
            metrics.message_framed(total as u64);
        }
        Ok(())
    }
}

fn validate_command(command: &str) -> Result<()> {
    if command.len() > COMMAND_SIZE {
        return Err(ProtocolError::CommandTooLong(command.len()));
    }
    if !command.is_ascii() || command.bytes().any(|b| b == 0) {
        return Err(ProtocolError::InvalidCommand(command.to_string()));
    }
    Ok(())
}
