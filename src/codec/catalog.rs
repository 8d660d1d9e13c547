//! Static lookup from `(protocol, message_type)` to body schema.

use std::{collections::HashMap, sync::LazyLock};

use super::CodecError;
use crate::schema::{BODY_TYPES, Body, BodyType};

static INDEX: LazyLock<HashMap<(i32, i32), &'static BodyType>> = LazyLock::new(|| {
    BODY_TYPES
        .iter()
        .map(|entry| ((entry.protocol, entry.message_type), entry))
        .collect()
});

/// Find the body schema registered for a header's identifiers.
#[must_use]
pub fn lookup(protocol: i32, message_type: i32) -> Option<&'static BodyType> {
    INDEX.get(&(protocol, message_type)).copied()
}

/// Decode `payload` with the schema registered for the given identifiers.
///
/// # Errors
///
/// Returns [`CodecError::UnknownMessageType`] when no schema is registered
/// and [`CodecError::Decode`] when the payload does not match it.
pub fn decode_body(protocol: i32, message_type: i32, payload: &[u8]) -> Result<Body, CodecError> {
    let entry = lookup(protocol, message_type).ok_or(CodecError::UnknownMessageType {
        protocol,
        message_type,
    })?;
    let (body, _) = (entry.decode)(payload)?;
    Ok(body)
}
