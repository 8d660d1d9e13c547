//! Fixtures and helpers for driving an [`EtpConnection`] in tests.
//!
//! These functions build sessions wired to the example handlers, craft the
//! handshake messages, and decode reply frames for assertions.

use std::sync::Arc;

use bytes::Bytes;
use etpproto::{
    config::ConnectionConfig,
    connection::{ConnectionRole, EtpConnection},
    handler::{
        CoreProtocol,
        DataspaceProtocol,
        DiscoveryProtocol,
        HandlerRegistry,
        StoreProtocol,
    },
    message::{Message, MessageFlags},
    protocol::CommunicationProtocol,
    schema::{
        core::{ProtocolException, RequestSession},
        datatypes::{DataValue, DataValueMap, SupportedProtocol, Version},
    },
};
use rstest::fixture;

use crate::handlers::{ExampleCore, ExampleDataspace, ExampleDiscovery, ExampleStore};

/// Number of resources [`ExampleDiscovery`] returns in the default registry.
pub const DEFAULT_RESOURCE_COUNT: usize = 64;

/// Handlers installed by [`registry_with`].
#[derive(Clone, Debug, Default)]
pub struct ExampleHandlers {
    pub dataspace: ExampleDataspace,
    pub discovery: ExampleDiscovery,
    pub store: ExampleStore,
}

/// Registry with every example handler installed.
///
/// # Panics
///
/// Never in practice: every protocol is registered once.
#[must_use]
pub fn registry_with(handlers: &ExampleHandlers) -> Arc<HandlerRegistry> {
    let advertised = [
        CommunicationProtocol::Discovery,
        CommunicationProtocol::Store,
        CommunicationProtocol::Dataspace,
    ]
    .into_iter()
    .map(|protocol| SupportedProtocol {
        protocol: protocol.id(),
        protocol_version: Version::ETP12,
        role: ConnectionRole::Server.as_str().to_owned(),
        protocol_capabilities: DataValueMap::new(),
    })
    .collect();
    let core = ExampleCore {
        supported_protocols: advertised,
    };
    let registry = HandlerRegistry::builder()
        .register(CommunicationProtocol::Core, CoreProtocol(core))
        .and_then(|b| b.register(CommunicationProtocol::Discovery, DiscoveryProtocol(handlers.discovery)))
        .and_then(|b| b.register(CommunicationProtocol::Store, StoreProtocol(handlers.store.clone())))
        .and_then(|b| {
            b.register(
                CommunicationProtocol::Dataspace,
                DataspaceProtocol(handlers.dataspace.clone()),
            )
        })
        .expect("example protocols are distinct")
        .build();
    Arc::new(registry)
}

/// Registry with default example handlers.
#[fixture]
pub fn registry() -> Arc<HandlerRegistry> {
    registry_with(&ExampleHandlers {
        discovery: ExampleDiscovery {
            count: DEFAULT_RESOURCE_COUNT,
        },
        ..ExampleHandlers::default()
    })
}

/// A fresh server session using the default registry.
#[fixture]
pub fn server(registry: Arc<HandlerRegistry>) -> EtpConnection {
    EtpConnection::new(&ConnectionConfig::default(), registry)
}

/// A fresh server session that requires authorization.
#[fixture]
pub fn auth_server(registry: Arc<HandlerRegistry>) -> EtpConnection {
    EtpConnection::new(&ConnectionConfig::default().auth_required(true), registry)
}

/// A fresh client session using the default registry.
#[fixture]
pub fn client(registry: Arc<HandlerRegistry>) -> EtpConnection {
    EtpConnection::new(&ConnectionConfig::client(), registry)
}

/// `RequestSession` with the given id, offering `capabilities`.
#[must_use]
pub fn request_session(message_id: i64, capabilities: &[(&str, DataValue)]) -> Message {
    let body = RequestSession {
        application_name: "etp_testing client".to_owned(),
        application_version: "1.2".to_owned(),
        supported_formats: vec!["xml".to_owned()],
        endpoint_capabilities: capabilities
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect(),
        ..RequestSession::default()
    };
    Message::from_body(body)
        .with_message_id(message_id)
        .with_flags(MessageFlags::FINALPART)
}

/// Open a session on `connection` with `RequestSession` id 2.
///
/// # Panics
///
/// Panics if the session does not answer with exactly one reply.
pub async fn open_session(connection: &mut EtpConnection, capabilities: &[(&str, DataValue)]) {
    let replies = connection
        .handle_message(Some(request_session(2, capabilities)))
        .await
        .expect("handshake has no connection error");
    assert_eq!(replies.len(), 1, "unexpected handshake replies: {replies:?}");
    assert!(connection.is_connected());
}

/// Decode every frame, panicking on failure.
///
/// # Panics
///
/// Panics if a frame does not decode into a complete message.
#[must_use]
pub fn decode_frames(frames: &[Bytes]) -> Vec<Message> {
    frames
        .iter()
        .map(|frame| {
            Message::decode(frame)
                .expect("frame decodes")
                .expect("frame is a complete message")
        })
        .collect()
}

/// Feed raw frames to `connection` in order and decode all replies.
///
/// # Panics
///
/// Panics if the session reports a connection error.
pub async fn drive_frames(connection: &mut EtpConnection, frames: &[Bytes]) -> Vec<Message> {
    let mut replies = Vec::new();
    for frame in frames {
        let out = connection
            .handle_bytes(frame)
            .await
            .expect("no connection error");
        replies.extend(decode_frames(&out));
    }
    replies
}

/// Error code of a `ProtocolException` reply.
#[must_use]
pub fn error_code(message: &Message) -> Option<i32> {
    message
        .body_as::<ProtocolException>()
        .and_then(|body| body.error.as_ref())
        .map(|info| info.code)
}
