//! The ETP message envelope.
//!
//! A [`Message`] pairs a [`MessageHeader`] with a typed [`Body`]. Besides
//! flag predicates it carries the two algorithms that move oversized
//! payloads across a size-limited transport: [`Message::encode_frames`]
//! (split and chunk, see [`fragment`]) and [`Message::reassemble`].

use std::ops::{BitOr, BitOrAssign};

use bincode::{Decode, Encode};
use bytes::Bytes;

use crate::{
    codec::{self, CodecError},
    schema::Body,
};

pub mod fragment;
mod reassemble;

pub use fragment::CHUNK_ENVELOPE_MARGIN;

/// Bit set carried in `MessageHeader::message_flags`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Encode, Decode)]
pub struct MessageFlags(i32);

impl MessageFlags {
    pub const NONE: Self = Self(0x0);
    /// A part of a multipart message.
    pub const MULTIPART: Self = Self(0x1);
    /// The final part of a multipart message.
    pub const FINALPART: Self = Self(0x2);
    pub const MULTIPART_AND_FINALPART: Self = Self(0x3);
    /// No data is available.
    pub const NO_DATA: Self = Self(0x4);
    /// The message body is compressed.
    pub const COMPRESSED: Self = Self(0x8);
    /// The sender requests an `Acknowledge`.
    pub const ACKNOWLEDGE: Self = Self(0x10);
    pub const HAS_HEADER_EXTENSION: Self = Self(0x20);

    #[must_use]
    pub const fn from_bits(bits: i32) -> Self { Self(bits) }

    #[must_use]
    pub const fn bits(self) -> i32 { self.0 }

    /// Whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    pub fn insert(&mut self, other: Self) { self.0 |= other.0; }

    pub fn remove(&mut self, other: Self) { self.0 &= !other.0; }

    pub fn set(&mut self, other: Self, enabled: bool) {
        if enabled {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for MessageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl BitOrAssign for MessageFlags {
    fn bitor_assign(&mut self, rhs: Self) { self.insert(rhs); }
}

/// Fixed-schema header preceding every body on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct MessageHeader {
    pub protocol: i32,
    pub message_type: i32,
    pub correlation_id: i64,
    pub message_id: i64,
    pub message_flags: MessageFlags,
}

/// A header and the body it describes.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    header: MessageHeader,
    body: Body,
}

impl Message {
    /// Pair an existing header with a body.
    #[must_use]
    pub const fn new(header: MessageHeader, body: Body) -> Self { Self { header, body } }

    /// Wrap a body in a fresh header naming its protocol and message type.
    ///
    /// Ids and flags start at zero; the session assigns them.
    #[must_use]
    pub fn from_body(body: impl Into<Body>) -> Self {
        let body = body.into();
        let header = MessageHeader {
            protocol: body.protocol(),
            message_type: body.message_type(),
            ..MessageHeader::default()
        };
        Self { header, body }
    }

    #[must_use]
    pub const fn with_message_id(mut self, message_id: i64) -> Self {
        self.header.message_id = message_id;
        self
    }

    #[must_use]
    pub const fn with_correlation_id(mut self, correlation_id: i64) -> Self {
        self.header.correlation_id = correlation_id;
        self
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: MessageFlags) -> Self {
        self.header.message_flags = flags;
        self
    }

    #[must_use]
    pub const fn header(&self) -> &MessageHeader { &self.header }

    pub const fn header_mut(&mut self) -> &mut MessageHeader { &mut self.header }

    #[must_use]
    pub const fn body(&self) -> &Body { &self.body }

    pub const fn body_mut(&mut self) -> &mut Body { &mut self.body }

    /// Borrow the body as a concrete type.
    #[must_use]
    pub fn body_as<T>(&self) -> Option<&T>
    where
        for<'a> &'a T: TryFrom<&'a Body>,
    {
        <&T>::try_from(&self.body).ok()
    }

    #[must_use]
    pub fn into_parts(self) -> (MessageHeader, Body) { (self.header, self.body) }

    /// Id of the exchange this message belongs to: its correlation id, or
    /// its own id when it opens the exchange.
    #[must_use]
    pub const fn exchange_id(&self) -> i64 {
        if self.header.correlation_id == 0 {
            self.header.message_id
        } else {
            self.header.correlation_id
        }
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.header.message_flags.contains(MessageFlags::FINALPART)
    }

    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        self.header.message_flags.contains(MessageFlags::MULTIPART)
    }

    #[must_use]
    pub const fn is_compressed(&self) -> bool {
        self.header.message_flags.contains(MessageFlags::COMPRESSED)
    }

    #[must_use]
    pub const fn is_requesting_ack(&self) -> bool {
        self.header.message_flags.contains(MessageFlags::ACKNOWLEDGE)
    }

    #[must_use]
    pub const fn has_header_extension(&self) -> bool {
        self.header
            .message_flags
            .contains(MessageFlags::HAS_HEADER_EXTENSION)
    }

    #[must_use]
    pub fn is_plural(&self) -> bool { self.body.is_plural() }

    #[must_use]
    pub fn is_chunk(&self) -> bool { self.body.is_chunk() }

    #[must_use]
    pub fn is_chunkable(&self) -> bool { self.body.is_chunkable() }

    /// A chunkable, non-chunk message whose data objects all point at blobs
    /// instead of carrying inline data.
    #[must_use]
    pub fn is_chunk_referencer(&self) -> bool {
        if self.is_chunk() {
            return false;
        }
        self.body
            .data_objects()
            .is_some_and(|objects| objects.iter().all(|object| object.is_blob_reference()))
    }

    pub fn set_final(&mut self, is_final: bool) {
        self.header
            .message_flags
            .set(MessageFlags::FINALPART, is_final);
    }

    pub fn add_flag(&mut self, flag: MessageFlags) { self.header.message_flags.insert(flag); }

    pub fn remove_flag(&mut self, flag: MessageFlags) { self.header.message_flags.remove(flag); }

    /// Serialize into one frame, ignoring any size limit.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if bincode rejects the message.
    pub fn encode(&self) -> Result<Bytes, CodecError> { codec::encode(self) }

    /// Decode one frame; see [`codec::decode`].
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the frame is not a valid message.
    pub fn decode(frame: &[u8]) -> Result<Option<Self>, CodecError> { codec::decode(frame) }
}
