//! Metric helpers for `etpproto`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature every helper is a no-op.

/// Name of the counter tracking processed messages.
pub const MESSAGES_PROCESSED: &str = "etpproto_messages_processed_total";
/// Name of the counter tracking `ProtocolException` replies, labelled by code.
pub const ERROR_REPLIES: &str = "etpproto_error_replies_total";
/// Name of the counter tracking completed chunk reassemblies.
pub const MULTIPART_REASSEMBLED: &str = "etpproto_multipart_reassembled_total";
/// Name of the counter tracking multipart assemblies evicted by timeout.
pub const MULTIPART_EXPIRED: &str = "etpproto_multipart_expired_total";

/// Direction of message processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Messages decoded from the peer.
    Inbound,
    /// Frames produced for the peer.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "labels need metrics"))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a processed message for the given direction.
pub fn inc_messages(direction: Direction) {
    #[cfg(feature = "metrics")]
    metrics::counter!(MESSAGES_PROCESSED, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record an error reply carrying `code`.
pub fn inc_error_replies(code: i32) {
    #[cfg(feature = "metrics")]
    metrics::counter!(ERROR_REPLIES, "code" => code.to_string()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = code;
}

/// Record a completed chunk reassembly.
pub fn inc_reassembled() {
    #[cfg(feature = "metrics")]
    metrics::counter!(MULTIPART_REASSEMBLED).increment(1);
}

/// Record `count` multipart assemblies dropped by the timeout sweep.
pub fn inc_expired(count: usize) {
    #[cfg(feature = "metrics")]
    metrics::counter!(MULTIPART_EXPIRED).increment(u64::try_from(count).unwrap_or(u64::MAX));
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}
