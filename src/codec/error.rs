//! Error types for the codec layer.

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

/// Failure to turn a frame into a message or back.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Serialization of the header or body failed.
    #[error("failed to encode message: {0}")]
    Encode(#[from] EncodeError),

    /// The frame is not a valid encoding of the expected schema.
    #[error("failed to decode message: {0}")]
    Decode(#[from] DecodeError),

    /// The catalog has no body schema for the header's identifiers.
    #[error("no body schema for protocol {protocol}, message type {message_type}")]
    UnknownMessageType {
        /// Protocol id from the header.
        protocol: i32,
        /// Message type id from the header.
        message_type: i32,
    },
}
