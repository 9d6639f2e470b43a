//! Observability and Metrics
//!
//! Counters for framing traffic and rejected frames.
//!
//! Uses atomic counters for thread-safe metrics collection, so one
//! [`Metrics`] can be shared by the parsers of many connections.

use crate::error::ProtocolError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for framing operations
#[derive(Debug)]
pub struct Metrics {
    /// Total bytes handed to parsers
    pub bytes_received: AtomicU64,
    /// Messages decoded successfully
    pub messages_decoded: AtomicU64,
    /// Headers with a foreign magic value
    pub invalid_magic: AtomicU64,
    /// Headers whose command field was unusable
    pub malformed_command: AtomicU64,
    /// Headers declaring a payload over the limit
    pub oversized_messages: AtomicU64,
    /// Payloads failing the checksum
    pub checksum_mismatches: AtomicU64,
    /// Payloads rejected by the packet codec
    pub payload_decode_errors: AtomicU64,
    /// Messages produced by framers
    pub messages_framed: AtomicU64,
    /// Total bytes produced by framers, headers included
    pub bytes_framed: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            bytes_received: AtomicU64::new(0),
            messages_decoded: AtomicU64::new(0),
            invalid_magic: AtomicU64::new(0),
            malformed_command: AtomicU64::new(0),
            oversized_messages: AtomicU64::new(0),
            checksum_mismatches: AtomicU64::new(0),
            payload_decode_errors: AtomicU64::new(0),
            messages_framed: AtomicU64::new(0),
            bytes_framed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record bytes fed into a parser
    pub fn bytes_received(&self, byte_count: u64) {
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a decoded message
    pub fn message_decoded(&self) {
        self.messages_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a framed message
    pub fn message_framed(&self, byte_count: u64) {
        self.messages_framed.fetch_add(1, Ordering::Relaxed);
        self.bytes_framed.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a rejected frame under the counter matching its error
    pub fn frame_rejected(&self, error: &ProtocolError) {
        let counter = match error {
            ProtocolError::InvalidMagic { .. } => &self.invalid_magic,
            ProtocolError::MalformedCommand => &self.malformed_command,
            ProtocolError::OversizedMessage { .. } => &self.oversized_messages,
            ProtocolError::ChecksumMismatch { .. } => &self.checksum_mismatches,
            ProtocolError::PayloadDecode { .. } => &self.payload_decode_errors,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            messages_decoded: self.messages_decoded.load(Ordering::Relaxed),
            invalid_magic: self.invalid_magic.load(Ordering::Relaxed),
            malformed_command: self.malformed_command.load(Ordering::Relaxed),
            oversized_messages: self.oversized_messages.load(Ordering::Relaxed),
            checksum_mismatches: self.checksum_mismatches.load(Ordering::Relaxed),
            payload_decode_errors: self.payload_decode_errors.load(Ordering::Relaxed),
            messages_framed: self.messages_framed.load(Ordering::Relaxed),
            bytes_framed: self.bytes_framed.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            bytes_received = snapshot.bytes_received,
            messages_decoded = snapshot.messages_decoded,
            invalid_magic = snapshot.invalid_magic,
            malformed_command = snapshot.malformed_command,
            oversized_messages = snapshot.oversized_messages,
            checksum_mismatches = snapshot.checksum_mismatches,
            payload_decode_errors = snapshot.payload_decode_errors,
            messages_framed = snapshot.messages_framed,
            bytes_framed = snapshot.bytes_framed,
            uptime_seconds = snapshot.uptime_seconds,
            "Framing metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub bytes_received: u64,
    pub messages_decoded: u64,
    pub invalid_magic: u64,
    pub malformed_command: u64,
    pub oversized_messages: u64,
    pub checksum_mismatches: u64,
    pub payload_decode_errors: u64,
    pub messages_framed: u64,
    pub bytes_framed: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// All rejected frames, whatever the reason
    pub fn frames_rejected(&self) -> u64 {
        self.invalid_magic
            + self.malformed_command
            + self.oversized_messages
            + self.checksum_mismatches
            + self.payload_decode_errors
    }
}

/// Global metrics instance (lazy static for simplicity)
static METRICS: once_cell::sync::Lazy<std::sync::Arc<Metrics>> =
    once_cell::sync::Lazy::new(|| std::sync::Arc::new(Metrics::new()));

/// Get the global metrics instance
pub fn global_metrics() -> std::sync::Arc<Metrics> {
    METRICS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_counted_by_kind() {
        let metrics = Metrics::new();
        metrics.frame_rejected(&ProtocolError::MalformedCommand);
        metrics.frame_rejected(&ProtocolError::ChecksumMismatch {
            expected: 1,
            actual: 2,
        });
        metrics.frame_rejected(&ProtocolError::ChecksumMismatch {
            expected: 3,
            actual: 4,
        });
        // Not a frame rejection
        metrics.frame_rejected(&ProtocolError::CommandTooLong(20));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.malformed_command, 1);
        assert_eq!(snapshot.checksum_mismatches, 2);
        assert_eq!(snapshot.frames_rejected(), 3);
    }

    #[test]
    fn test_traffic_counters() {
        let metrics = Metrics::new();
        metrics.bytes_received(100);
        metrics.bytes_received(24);
        metrics.message_decoded();
        metrics.message_framed(48);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.bytes_received, 124);
        assert_eq!(snapshot.messages_decoded, 1);
        assert_eq!(snapshot.messages_framed, 1);
        assert_eq!(snapshot.bytes_framed, 48);
    }
}
