//! Inbound reconstruction of chunked messages.

use log::{debug, warn};

use super::Message;

impl Message {
    /// Rebuild one message from the parts of a chunked exchange.
    ///
    /// The first chunk referencer found carries the result; the data objects
    /// of later referencers are merged into it. Each data object then
    /// receives the payload of every chunk naming its blob id, in arrival
    /// order, and loses the blob id once it holds data.
    ///
    /// Returns `None` when `parts` holds no referencer.
    #[must_use]
    pub fn reassemble(parts: Vec<Self>) -> Option<Self> {
        let mut carrier: Option<Self> = None;
        let mut chunks = Vec::new();
        for part in parts {
            if part.is_chunk() {
                chunks.push(part);
            } else if part.is_chunk_referencer() {
                match carrier.as_mut() {
                    None => carrier = Some(part),
                    Some(carrier) => {
                        let (header, body) = part.into_parts();
                        if let Err(body) = carrier.body_mut().absorb(body) {
                            warn!(
                                "dropping {} referencer {} from exchange of {}",
                                body.type_name(),
                                header.message_id,
                                carrier.body().type_name()
                            );
                        }
                    }
                }
            }
        }

        let mut message = carrier?;
        debug!(
            "reassembling {} from {} chunks",
            message.body().type_name(),
            chunks.len()
        );
        if let Some(objects) = message.body_mut().data_objects_mut() {
            for object in objects {
                for chunk in &chunks {
                    if let Some((blob_id, data)) = chunk.body().chunk_parts() {
                        if object.blob_id == Some(blob_id) {
                            object.data.extend_from_slice(data);
                        }
                    }
                }
                if !object.data.is_empty() {
                    object.blob_id = None;
                }
            }
        }
        Some(message)
    }
}
