//! # Utility Modules
//!
//! Supporting utilities for checksums, logging, and metrics.
//!
//! ## Components
//! - **Digest**: double SHA-256 and the 4-byte wire checksum
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Thread-safe framing counters

pub mod digest;
pub mod logging;
pub mod metrics;

pub use digest::{checksum, hash256};
pub use metrics::{Metrics, MetricsSnapshot};
