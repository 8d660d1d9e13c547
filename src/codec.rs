//! Binary codec for ETP frames.
//!
//! A frame is the bincode encoding of a [`MessageHeader`] immediately
//! followed by the bincode encoding of the body selected by the header's
//! `(protocol, message_type)` pair. Frame boundaries belong to the
//! transport, so no length prefix is written.

use bincode::config;
use bytes::Bytes;
use log::debug;

use crate::message::{Message, MessageHeader};

pub mod catalog;
pub mod error;

pub use error::CodecError;

/// Upper bound on the bytes a single frame may claim while decoding.
///
/// Length prefixes are checked against it before anything is allocated, so a
/// hostile prefix fails with [`CodecError::Decode`] instead of exhausting
/// memory.
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Decoding configuration shared by the header and every body schema.
pub(crate) type DecodeConfig =
    config::Configuration<config::LittleEndian, config::Varint, config::Limit<MAX_FRAME_BYTES>>;

pub(crate) const fn decode_config() -> DecodeConfig {
    config::standard().with_limit::<MAX_FRAME_BYTES>()
}

/// Serialize a message into a single frame.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if bincode rejects the header or body.
pub fn encode(message: &Message) -> Result<Bytes, CodecError> {
    let mut out = bincode::encode_to_vec(message.header(), config::standard())?;
    message.body().encode_into(&mut out)?;
    Ok(Bytes::from(out))
}

/// Number of bytes the header occupies on the wire.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if bincode rejects the header.
pub fn encoded_header_len(header: &MessageHeader) -> Result<usize, CodecError> {
    Ok(bincode::encode_to_vec(header, config::standard())?.len())
}

/// Read the fixed-schema header at the start of a frame.
///
/// Returns the header and the number of bytes it occupied.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the frame does not start with a header.
pub fn decode_header(frame: &[u8]) -> Result<(MessageHeader, usize), CodecError> {
    Ok(bincode::decode_from_slice(frame, decode_config())?)
}

/// Decode a frame into a [`Message`].
///
/// A header announcing a negative protocol id marks a partial frame and
/// yields `Ok(None)`. When the body does not decode under the announced
/// protocol it is retried against the Core catalog, since error replies keep
/// the protocol id of the request they answer.
///
/// # Errors
///
/// Returns the failure of the Core retry when neither attempt succeeds.
pub fn decode(frame: &[u8]) -> Result<Option<Message>, CodecError> {
    let (header, read) = decode_header(frame)?;
    if header.protocol < 0 {
        return Ok(None);
    }
    let payload = frame.get(read..).unwrap_or_default();
    let body = match catalog::decode_body(header.protocol, header.message_type, payload) {
        Ok(body) => body,
        Err(err) => {
            debug!(
                "body of protocol {} type {} not decodable ({err}); retrying as core",
                header.protocol, header.message_type
            );
            catalog::decode_body(0, header.message_type, payload)?
        }
    };
    debug!("decoded {header:?}");
    Ok(Some(Message::new(header, body)))
}
