//! The per-peer session state machine.
//!
//! [`EtpConnection`] turns each inbound message into the ordered list of
//! replies it calls for. Processing one input runs, in order: the null-input
//! check, the authorization gate, the connection gate, acknowledgement,
//! session close and open, chunk accumulation, and finally dispatch to the
//! registered [`ProtocolHandler`](crate::handler::ProtocolHandler).
//!
//! Message ids of everything the session emits come from its
//! [`MessageIdCounter`]; handlers never assign ids.

use std::{collections::HashMap, sync::Arc, time::Duration};

use bytes::Bytes;
use futures::{StreamExt, future::BoxFuture};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::{
    capability::EndpointCapabilityKind,
    client_info::ClientInfo,
    config::ConnectionConfig,
    error::{ConnectionError, EtpError},
    handler::HandlerRegistry,
    message::{Message, MessageFlags},
    metrics::{self, Direction},
    protocol::CommunicationProtocol,
    schema::{Body, core::Acknowledge, datatypes::SupportedProtocol},
};

mod ids;
mod multipart;
mod state;

pub use ids::{MESSAGE_ID_STEP, MessageIdCounter};
use multipart::MultipartCache;
pub use state::SessionState;

/// Which end of the session this endpoint plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    /// Talks to a remote server; opens sessions with `RequestSession`.
    Client,
    /// Waits for clients; answers `RequestSession` with `OpenSession`.
    #[default]
    Server,
}

impl ConnectionRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
        }
    }
}

/// Session state of one peer.
#[derive(Debug)]
pub struct EtpConnection {
    role: ConnectionRole,
    auth_required: bool,
    is_connected: bool,
    closed: bool,
    client_info: ClientInfo,
    ids: MessageIdCounter,
    registry: Arc<HandlerRegistry>,
    chunk_msg_cache: MultipartCache,
    error_msg_cache: HashMap<i64, Vec<Message>>,
}

impl EtpConnection {
    /// Create a fresh, unconnected session.
    #[must_use]
    pub fn new(config: &ConnectionConfig, registry: Arc<HandlerRegistry>) -> Self {
        let role = config.role();
        Self {
            role,
            auth_required: config.is_auth_required(),
            is_connected: false,
            closed: false,
            client_info: config.client_info(),
            ids: MessageIdCounter::for_role(role),
            registry,
            chunk_msg_cache: MultipartCache::default(),
            error_msg_cache: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> ConnectionRole { self.role }

    #[must_use]
    pub const fn is_connected(&self) -> bool { self.is_connected }

    #[must_use]
    pub const fn is_auth_required(&self) -> bool { self.auth_required }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_connected {
            SessionState::Connected
        } else if self.closed {
            SessionState::Closed
        } else if self.auth_required && !self.client_info.authenticated {
            SessionState::Unauthenticated
        } else {
            SessionState::AuthenticatedNotConnected
        }
    }

    #[must_use]
    pub const fn client_info(&self) -> &ClientInfo { &self.client_info }

    pub const fn client_info_mut(&mut self) -> &mut ClientInfo { &mut self.client_info }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry { &self.registry }

    /// Protocols this endpoint advertises during the handshake.
    #[must_use]
    pub fn supported_protocols(&self) -> Vec<SupportedProtocol> { self.registry.supported_protocols(self.role) }

    /// Consume the next outbound message id.
    #[must_use]
    pub fn next_message_id(&self) -> i64 { self.ids.next_id() }

    /// Number of chunked exchanges still waiting for their final part.
    #[must_use]
    pub fn pending_multipart(&self) -> usize { self.chunk_msg_cache.len() }

    /// Process one decoded inbound message.
    ///
    /// `None` stands for a frame that could not be decoded and yields an
    /// `InvalidMessage` error reply.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::MissingReferencer`] when a chunked
    /// exchange completes without any referencer part. Protocol faults are
    /// never returned here; they become replies.
    pub async fn handle_message(&mut self, message: Option<Message>) -> Result<Vec<Message>, ConnectionError> {
        Ok(self.process(message).await?.into_iter().flatten().collect())
    }

    /// Decode one frame, process it and encode every reply.
    ///
    /// # Errors
    ///
    /// See [`handle_message`](Self::handle_message).
    pub async fn handle_bytes(&mut self, frame: &[u8]) -> Result<Vec<Bytes>, ConnectionError> {
        let message = Message::decode(frame).unwrap_or_else(|err| {
            debug!("{}: undecodable frame of {} bytes: {err}", self.client_info, frame.len());
            None
        });
        let replies = self.handle_message(message).await?;
        Ok(replies
            .iter()
            .flat_map(|reply| self.encode_outbound(reply))
            .collect())
    }

    /// Encode a message initiated by the application, followed by an
    /// optional error message.
    ///
    /// The message receives a fresh id and the final flag. Every frame is
    /// paired with that id, including the error frames, so the caller can
    /// track the exchange the frames belong to.
    pub fn prepare_outbound(&mut self, message: Option<Message>, error: Option<Message>) -> Vec<(i64, Bytes)> {
        let request_id = self.ids.next_id();
        let mut frames = Vec::new();
        if let Some(mut message) = message {
            message.header_mut().message_id = request_id;
            message.add_flag(MessageFlags::FINALPART);
            frames.extend(self.encode_outbound(&message));
        }
        if let Some(error) = error {
            frames.extend(self.encode_outbound(&error));
        }
        frames
            .into_iter()
            .map(|frame| (request_id, frame))
            .collect()
    }

    /// Encode one message under the negotiated frame size limit.
    #[must_use]
    pub fn encode_outbound(&self, message: &Message) -> Vec<Bytes> {
        let frames = message.encode_frames(self.client_info.max_frame_size(), &self.ids);
        for _ in &frames {
            metrics::inc_messages(Direction::Outbound);
        }
        frames
    }

    /// Drop chunked exchanges older than the negotiated
    /// `MultipartMessageTimeoutPeriod`, returning how many were dropped.
    ///
    /// Does nothing when the capability is not set. Assemblies then stay
    /// until their final part arrives, bounded only by
    /// [`ClientInfo::max_concurrent_multipart`]; parts keep appending to an
    /// open assembly, so a peer that never finishes one holds its memory for
    /// the life of the session.
    pub fn purge_expired_multipart(&mut self, now: Instant) -> usize {
        let Some(timeout) = self
            .client_info
            .capability_as_i64(EndpointCapabilityKind::MultipartMessageTimeoutPeriod.name())
            .and_then(|secs| u64::try_from(secs).ok())
        else {
            return 0;
        };
        let expired = self
            .chunk_msg_cache
            .purge_older_than(now, Duration::from_secs(timeout));
        for exchange_id in &expired {
            warn!(
                "{}: dropping multipart exchange {exchange_id} after {timeout}s without its final part",
                self.client_info
            );
            self.error_msg_cache.remove(exchange_id);
        }
        metrics::inc_expired(expired.len());
        expired.len()
    }

    fn process(&mut self, message: Option<Message>) -> BoxFuture<'_, Result<Vec<Option<Message>>, ConnectionError>> {
        Box::pin(async move {
            let Some(message) = message else {
                return Ok(vec![Some(self.gate_reply(&EtpError::InvalidMessage))]);
            };
            metrics::inc_messages(Direction::Inbound);
            debug!("{}: received {:?}", self.client_info, message.header());

            if self.auth_required
                && !self.client_info.authenticated
                && !matches!(message.body(), Body::Authorize(_) | Body::AuthorizeResponse(_))
            {
                return Ok(vec![Some(self.gate_reply(&EtpError::AuthorizationRequired))]);
            }
            if message.header().protocol != CommunicationProtocol::Core.id() && !self.is_connected {
                return Ok(vec![Some(self.gate_reply(&EtpError::InvalidState))]);
            }

            let mut replies = Vec::new();
            if message.is_requesting_ack() && !matches!(message.body(), Body::Acknowledge(_)) {
                replies.push(Some(
                    Message::from_body(Acknowledge {})
                        .with_message_id(self.ids.next_id())
                        .with_correlation_id(message.header().message_id),
                ));
            }

            if self.is_connected && matches!(message.body(), Body::CloseSession(_)) {
                debug!("{}: CloseSession received", self.client_info);
                self.is_connected = false;
                self.closed = true;
                return Ok(replies);
            }

            let offered = match (self.role, message.body()) {
                (ConnectionRole::Server, Body::RequestSession(body)) => Some(&body.endpoint_capabilities),
                (ConnectionRole::Client, Body::OpenSession(body)) => Some(&body.endpoint_capabilities),
                _ => None,
            };
            if let Some(offered) = offered {
                self.is_connected = true;
                self.closed = false;
                self.client_info.negotiate(offered);
            }

            if message.is_multipart() && (message.is_chunk() || message.is_chunk_referencer()) {
                let exchange_id = message.exchange_id();
                let limit = self.client_info.max_concurrent_multipart();
                if !self.chunk_msg_cache.contains(exchange_id) && self.chunk_msg_cache.len() >= limit {
                    warn!(
                        "{}: refusing multipart exchange {exchange_id}: {limit} already open",
                        self.client_info
                    );
                    replies.push(Some(self.error_reply(&EtpError::LimitExceeded, exchange_id)));
                    return Ok(replies);
                }
                let complete = message.is_final();
                self.chunk_msg_cache.push(exchange_id, message, Instant::now());
                if complete {
                    replies.extend(self.complete_multipart(exchange_id).await?);
                }
                return Ok(replies);
            }

            replies.extend(self.dispatch(message).await);
            Ok(replies)
        })
    }

    async fn complete_multipart(&mut self, exchange_id: i64) -> Result<Vec<Option<Message>>, ConnectionError> {
        let parts = self.chunk_msg_cache.take(exchange_id);
        debug!(
            "{}: reassembling {} parts of exchange {exchange_id}",
            self.client_info,
            parts.len()
        );
        let Some(mut reassembled) = Message::reassemble(parts) else {
            error!(
                "{}: multipart exchange {exchange_id} completed without a chunk referencer",
                self.client_info
            );
            self.error_msg_cache.remove(&exchange_id);
            return Err(ConnectionError::MissingReferencer {
                correlation_id: exchange_id,
            });
        };
        metrics::inc_reassembled();
        // Parts were acknowledged on arrival; the whole is a single final message.
        reassembled.remove_flag(MessageFlags::MULTIPART | MessageFlags::ACKNOWLEDGE);
        reassembled.set_final(true);

        let mut replies = Vec::new();
        for reply in self.process(Some(reassembled)).await? {
            match reply {
                Some(reply) => replies.push(Some(reply)),
                None => {
                    let err = self.error_reply(&EtpError::InvalidMessage, 0);
                    self.error_msg_cache.entry(exchange_id).or_default().push(err);
                }
            }
        }
        if let Some(errors) = self.error_msg_cache.remove(&exchange_id) {
            replies.extend(errors.into_iter().map(Some));
        }
        Ok(replies)
    }

    async fn dispatch(&mut self, message: Message) -> Vec<Option<Message>> {
        let (header, body) = message.into_parts();
        let Some(handler) = self.registry.get(header.protocol).cloned() else {
            debug!("{}: unknown protocol id {}", self.client_info, header.protocol);
            let err = EtpError::UnsupportedProtocol(header.protocol);
            error!("{}: {err}", self.client_info);
            return vec![Some(self.error_reply(&err, header.message_id))];
        };

        let mut stream = match handler.handle(body, &header, &mut self.client_info).await {
            Ok(response) => response.into_stream(),
            Err(err) => {
                error!("{}: handler failed: {err}", self.client_info);
                return vec![Some(self.error_reply(&err, header.message_id))];
            }
        };

        let mut replies = Vec::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(Some(mut reply)) => {
                    let reply_header = reply.header_mut();
                    reply_header.message_id = self.ids.next_id();
                    if reply_header.correlation_id == 0 {
                        reply_header.correlation_id = header.message_id;
                    }
                    reply.set_final(true);
                    replies.push(Some(reply));
                }
                Ok(None) => replies.push(None),
                Err(err) => {
                    error!("{}: handler failed: {err}", self.client_info);
                    replies.push(Some(self.error_reply(&err, header.message_id)));
                    break;
                }
            }
        }
        replies
    }

    /// Error reply for an input rejected before dispatch.
    fn gate_reply(&self, err: &EtpError) -> Message {
        debug!("{}: rejecting input: {err}", self.client_info);
        self.error_reply(err, 0)
    }

    fn error_reply(&self, err: &EtpError, correlation_id: i64) -> Message {
        metrics::inc_error_replies(err.code());
        let mut reply = err.to_message(self.ids.next_id(), correlation_id);
        reply.set_final(true);
        reply
    }
}

#[cfg(test)]
mod tests;
