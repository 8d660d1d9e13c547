//! Outbound encoding under a frame size limit.
//!
//! A message that fits the limit becomes one frame. An oversized plural
//! message is bisected by entry count and each half is encoded again; a
//! plural message down to a single data object moves that object's payload
//! into a series of chunk messages behind a "referencer" copy of the
//! message. Anything else becomes a `MaxSizeExceeded` error reply, which is
//! always emitted regardless of the limit.

use std::num::NonZeroUsize;

use bytes::Bytes;
use log::{debug, error};

use super::{Message, MessageFlags, MessageHeader};
use crate::{
    codec,
    connection::MessageIdCounter,
    error::EtpError,
    schema::{Body, datatypes::Uuid},
};

/// Bytes of every frame reserved for the non-payload part of a chunk.
pub const CHUNK_ENVELOPE_MARGIN: usize = 50;

impl Message {
    /// Encode the message into frames no larger than `max_frame` bytes.
    ///
    /// `None` means unbounded. Extra message ids needed for additional parts
    /// come from `ids`. Failures never escape: they are emitted as a final
    /// `ProtocolException` frame in place of the parts that could not be
    /// produced.
    #[must_use]
    pub fn encode_frames(&self, max_frame: Option<NonZeroUsize>, ids: &MessageIdCounter) -> Vec<Bytes> {
        let mut frames = Vec::new();
        encode_part(self.clone(), max_frame, ids, &mut frames);
        frames
    }
}

fn encode_part(
    message: Message,
    max_frame: Option<NonZeroUsize>,
    ids: &MessageIdCounter,
    out: &mut Vec<Bytes>,
) {
    let correlation_id = message.header().correlation_id;
    if let Err(err) = fragment(message, max_frame, ids, out) {
        debug!("replacing unencodable message with error reply: {err}");
        let mut reply = err.to_message(ids.next_id(), correlation_id);
        reply.set_final(true);
        match reply.encode() {
            Ok(frame) => out.push(frame),
            Err(encode_err) => error!("failed to encode error reply: {encode_err}"),
        }
    }
}

fn internal(err: codec::CodecError) -> EtpError { EtpError::Internal(err.to_string()) }

fn fragment(
    mut message: Message,
    max_frame: Option<NonZeroUsize>,
    ids: &MessageIdCounter,
    out: &mut Vec<Bytes>,
) -> Result<(), EtpError> {
    let frame = message.encode().map_err(internal)?;
    let Some(max) = max_frame.filter(|max| frame.len() > max.get()) else {
        out.push(frame);
        return Ok(());
    };
    if !message.is_plural() {
        return Err(EtpError::MaxSizeExceeded);
    }

    match message.body().cuttable_len() {
        Some(entries) if entries > 1 => {
            let rest = message
                .body_mut()
                .split_off(entries.div_ceil(2))
                .ok_or(EtpError::MaxSizeExceeded)?;
            let (first, second) = bisect(message, rest, ids);
            encode_part(first, max_frame, ids, out);
            encode_part(second, max_frame, ids, out);
            Ok(())
        }
        Some(1) if message.is_chunkable() => {
            let header_len = codec::encoded_header_len(message.header()).map_err(internal)?;
            let body_len = frame.len().saturating_sub(header_len);
            encode_chunked(message, body_len, max, ids, out)
        }
        _ => Err(EtpError::MaxSizeExceeded),
    }
}

/// Turn a message whose body was split into two multipart halves.
///
/// Only the second half may carry the final flag of the original.
fn bisect(mut first: Message, rest: Body, ids: &MessageIdCounter) -> (Message, Message) {
    let header = MessageHeader {
        message_id: ids.next_id(),
        correlation_id: first.exchange_id(),
        ..*first.header()
    };
    let mut second = Message::new(header, rest);
    first.add_flag(MessageFlags::MULTIPART);
    first.set_final(false);
    second.add_flag(MessageFlags::MULTIPART);
    (first, second)
}

fn encode_chunked(
    mut message: Message,
    body_len: usize,
    max: NonZeroUsize,
    ids: &MessageIdCounter,
    out: &mut Vec<Bytes>,
) -> Result<(), EtpError> {
    let chunk_size = max
        .get()
        .checked_sub(CHUNK_ENVELOPE_MARGIN)
        .filter(|size| *size > 0)
        .ok_or(EtpError::MaxSizeExceeded)?;
    let chunk_count = body_len.div_ceil(chunk_size);
    let protocol = message.header().protocol;
    let exchange_id = message.exchange_id();
    let was_final = message.is_final();

    let objects = message
        .body_mut()
        .data_objects_mut()
        .ok_or(EtpError::MaxSizeExceeded)?;
    // An object without inline data is already a blob reference.
    if objects.iter().any(|object| object.data.is_empty()) {
        return Err(EtpError::MaxSizeExceeded);
    }

    let mut chunks = Vec::with_capacity(chunk_count * objects.len());
    for object in objects {
        let blob_id = Uuid::new_v4();
        let data = std::mem::take(&mut object.data);
        object.blob_id = Some(blob_id);
        for index in 0..chunk_count {
            let start = (index * chunk_size).min(data.len());
            let end = (start + chunk_size).min(data.len());
            let body = Body::new_chunk(
                protocol,
                blob_id,
                data[start..end].to_vec(),
                index + 1 == chunk_count,
            )
            .ok_or_else(|| EtpError::Internal(format!("no chunk message in protocol {protocol}")))?;
            chunks.push(body);
        }
    }
    debug!(
        "sending {} chunks of at most {chunk_size} bytes for exchange {exchange_id}",
        chunks.len()
    );

    message.set_final(false);
    message.add_flag(MessageFlags::MULTIPART);
    encode_part(message, Some(max), ids, out);

    let last = chunks.len().saturating_sub(1);
    for (index, body) in chunks.into_iter().enumerate() {
        let flags = if index == last && was_final {
            MessageFlags::MULTIPART_AND_FINALPART
        } else {
            MessageFlags::MULTIPART
        };
        let chunk = Message::from_body(body)
            .with_message_id(ids.next_id())
            .with_correlation_id(exchange_id)
            .with_flags(flags);
        encode_part(chunk, Some(max), ids, out);
    }
    Ok(())
}
