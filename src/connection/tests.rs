use std::{
    collections::BTreeMap,
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use rstest::{fixture, rstest};
use tokio::time::Instant;

use super::{ConnectionRole, EtpConnection, MessageIdCounter, SessionState};
use crate::{
    client_info::ClientInfo,
    config::ConnectionConfig,
    error::{ConnectionError, EtpError},
    handler::{CoreHandler, CoreProtocol, HandlerRegistry, StoreHandler, StoreProtocol},
    message::{Message, MessageFlags, MessageHeader},
    protocol::CommunicationProtocol,
    response::Response,
    schema::{
        Body,
        core::{
            Acknowledge,
            Authorize,
            AuthorizeResponse,
            CloseSession,
            OpenSession,
            Ping,
            Pong,
            ProtocolException,
            RequestSession,
        },
        dataspace::GetDataspaces,
        datatypes::{DataObject, DataValue, Resource, Uuid},
        discovery::GetResources,
        store::{Chunk, GetDataObjects, GetDataObjectsResponse, PutDataObjects, PutDataObjectsResponse},
    },
};

struct Core;

#[async_trait]
impl CoreHandler for Core {
    async fn on_request_session(
        &self,
        _message: RequestSession,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        Ok(Response::reply(OpenSession::default()))
    }

    async fn on_authorize(
        &self,
        message: Authorize,
        _header: &MessageHeader,
        client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        client_info.authenticated = message.authorization == "Basic ok";
        Ok(Response::reply(AuthorizeResponse {
            success: client_info.authenticated,
            challenges: Vec::new(),
        }))
    }

    async fn on_ping(
        &self,
        message: Ping,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        Ok(Response::reply(Pong {
            current_date_time: message.current_date_time,
        }))
    }
}

#[derive(Clone, Default)]
struct Store {
    received: Arc<Mutex<Vec<Body>>>,
}

#[async_trait]
impl StoreHandler for Store {
    async fn on_put_data_objects(
        &self,
        message: PutDataObjects,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let success = message
            .data_objects
            .keys()
            .map(|key| (key.clone(), Default::default()))
            .collect();
        self.received
            .lock()
            .expect("lock not poisoned")
            .push(message.into());
        Ok(Response::reply(PutDataObjectsResponse { success }))
    }

    async fn on_get_data_objects(
        &self,
        message: GetDataObjects,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let replies = message.uris.into_keys().map(|key| {
            if key == "missing" {
                Err(EtpError::NotFound)
            } else {
                Ok(Some(Message::from_body(GetDataObjectsResponse::default())))
            }
        });
        Ok(Response::Stream(stream::iter(replies.collect::<Vec<_>>()).boxed()))
    }

    async fn on_get_data_objects_response(
        &self,
        _message: GetDataObjectsResponse,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        Ok(Response::Vec(vec![None]))
    }
}

fn registry(store: &Store) -> Arc<HandlerRegistry> {
    Arc::new(
        HandlerRegistry::builder()
            .register(CommunicationProtocol::Core, CoreProtocol(Core))
            .and_then(|b| b.register(CommunicationProtocol::Store, StoreProtocol(store.clone())))
            .expect("distinct protocols")
            .build(),
    )
}

fn server_with(config: &ConnectionConfig) -> EtpConnection { EtpConnection::new(config, registry(&Store::default())) }

#[fixture]
fn server() -> EtpConnection { server_with(&ConnectionConfig::default()) }

fn request_session(id: i64) -> Message {
    Message::from_body(RequestSession::default())
        .with_message_id(id)
        .with_flags(MessageFlags::FINALPART)
}

async fn open(connection: &mut EtpConnection) {
    let replies = connection
        .handle_message(Some(request_session(2)))
        .await
        .expect("session opens");
    assert_eq!(replies.len(), 1);
}

fn error_code(message: &Message) -> Option<i32> {
    message
        .body_as::<ProtocolException>()
        .and_then(|body| body.error.as_ref())
        .map(|info| info.code)
}

fn blob_object(size: usize) -> DataObject {
    DataObject {
        resource: Resource {
            uri: "eml:///witsml20.Well(1)".to_owned(),
            ..Resource::default()
        },
        format: "xml".to_owned(),
        blob_id: None,
        data: (0..size).map(|i| u8::try_from(i % 199).expect("fits")).collect(),
    }
}

#[rstest]
#[tokio::test]
async fn request_session_opens_the_session(#[from(server)] mut connection: EtpConnection) {
    assert_eq!(connection.state(), SessionState::AuthenticatedNotConnected);

    let replies = connection
        .handle_message(Some(request_session(2)))
        .await
        .expect("no connection error");

    assert_eq!(replies.len(), 1);
    let reply = &replies[0];
    assert!(reply.body_as::<OpenSession>().is_some());
    assert_eq!(reply.header().message_id, 1);
    assert_eq!(reply.header().correlation_id, 2);
    assert!(reply.is_final());
    assert!(connection.is_connected());
    assert_eq!(connection.state(), SessionState::Connected);
}

#[rstest]
#[tokio::test]
async fn acknowledge_precedes_the_reply(#[from(server)] mut connection: EtpConnection) {
    let request = request_session(2).with_flags(MessageFlags::FINALPART | MessageFlags::ACKNOWLEDGE);
    let replies = connection
        .handle_message(Some(request))
        .await
        .expect("no connection error");

    assert_eq!(replies.len(), 2);
    assert!(replies[0].body_as::<Acknowledge>().is_some());
    assert!(!replies[0].is_final());
    assert_eq!(replies[0].header().correlation_id, 2);
    assert_eq!(replies[0].header().message_id, 1);
    assert!(replies[1].body_as::<OpenSession>().is_some());
    assert!(replies[1].is_final());
    assert_eq!(replies[1].header().message_id, 3);
}

#[rstest]
#[tokio::test]
async fn acknowledge_is_never_acknowledged(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let ack = Message::from_body(Acknowledge {})
        .with_message_id(4)
        .with_flags(MessageFlags::ACKNOWLEDGE);
    let replies = connection.handle_message(Some(ack)).await.expect("no connection error");
    assert_eq!(replies.len(), 1);
    assert_eq!(error_code(&replies[0]), Some(7));
}

#[rstest]
#[tokio::test]
async fn close_session_disconnects_silently(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let close = Message::from_body(CloseSession::default()).with_message_id(4);
    let replies = connection.handle_message(Some(close)).await.expect("no connection error");

    assert!(replies.is_empty());
    assert!(!connection.is_connected());
    assert_eq!(connection.state(), SessionState::Closed);
}

#[rstest]
#[tokio::test]
async fn non_core_messages_need_an_open_session(#[from(server)] mut connection: EtpConnection) {
    let request = Message::from_body(GetResources::default()).with_message_id(2);
    let replies = connection.handle_message(Some(request)).await.expect("no connection error");

    assert_eq!(replies.len(), 1);
    assert_eq!(error_code(&replies[0]), Some(8));
    assert_eq!(replies[0].header().correlation_id, 0);
    assert!(replies[0].is_final());
}

#[rstest]
#[tokio::test]
async fn undecodable_input_is_an_invalid_message(#[from(server)] mut connection: EtpConnection) {
    let replies = connection.handle_message(None).await.expect("no connection error");
    assert_eq!(replies.len(), 1);
    assert_eq!(error_code(&replies[0]), Some(19));
    assert_eq!(replies[0].header().message_id, 1);
}

#[rstest]
#[tokio::test]
async fn garbage_bytes_produce_one_error_frame(#[from(server)] mut connection: EtpConnection) {
    let frames = connection
        .handle_bytes(&[0xff, 0xff, 0xff])
        .await
        .expect("no connection error");
    assert_eq!(frames.len(), 1);
    let reply = Message::decode(&frames[0])
        .expect("reply decodes")
        .expect("reply complete");
    assert_eq!(error_code(&reply), Some(19));
}

#[tokio::test]
async fn authorization_gates_everything_else() {
    let mut connection = server_with(&ConnectionConfig::default().auth_required(true));
    assert_eq!(connection.state(), SessionState::Unauthenticated);

    let replies = connection
        .handle_message(Some(request_session(2)))
        .await
        .expect("no connection error");
    assert_eq!(error_code(&replies[0]), Some(27));
    assert!(!connection.is_connected());

    let authorize = Message::from_body(Authorize {
        authorization: "Basic ok".to_owned(),
        supplemental_authorization: BTreeMap::new(),
    })
    .with_message_id(4);
    let replies = connection.handle_message(Some(authorize)).await.expect("no connection error");
    assert_eq!(
        replies[0].body_as::<AuthorizeResponse>().map(|r| r.success),
        Some(true)
    );
    assert_eq!(connection.state(), SessionState::AuthenticatedNotConnected);

    let replies = connection
        .handle_message(Some(request_session(6)))
        .await
        .expect("no connection error");
    assert!(replies[0].body_as::<OpenSession>().is_some());
}

#[tokio::test]
async fn clients_ignore_auth_and_open_on_open_session() {
    let mut connection = server_with(
        &ConnectionConfig::client()
            .auth_required(true)
            .capability("MaxWebSocketMessagePayloadSize", 10_000_i64),
    );
    assert!(!connection.is_auth_required());
    assert_eq!(connection.next_message_id(), 2);

    let mut offer = OpenSession::default();
    offer
        .endpoint_capabilities
        .insert("MaxWebSocketMessagePayloadSize".to_owned(), DataValue::Long(4_096));
    let open_session = Message::from_body(offer)
        .with_message_id(1)
        .with_correlation_id(2);
    let replies = connection
        .handle_message(Some(open_session))
        .await
        .expect("no connection error");

    assert!(connection.is_connected());
    assert_eq!(connection.client_info().max_frame_size(), NonZeroUsize::new(4_096));
    // The client has no OpenSession handler of its own.
    assert_eq!(error_code(&replies[0]), Some(7));
    assert_eq!(replies[0].header().message_id, 4);
}

#[rstest]
#[tokio::test]
async fn unregistered_protocols_are_unsupported(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let request = Message::from_body(GetDataspaces::default()).with_message_id(4);
    let replies = connection.handle_message(Some(request)).await.expect("no connection error");

    assert_eq!(replies.len(), 1);
    assert_eq!(error_code(&replies[0]), Some(4));
    assert_eq!(replies[0].header().correlation_id, 4);
}

#[rstest]
#[tokio::test]
async fn stream_errors_end_the_reply_sequence(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let uris = ["a", "missing", "z"]
        .into_iter()
        .map(|key| (key.to_owned(), format!("eml:///{key}")))
        .collect();
    let request = Message::from_body(GetDataObjects {
        uris,
        format: "xml".to_owned(),
    })
    .with_message_id(4);

    let replies = connection.handle_message(Some(request)).await.expect("no connection error");

    assert_eq!(replies.len(), 2);
    assert!(replies[0].body_as::<GetDataObjectsResponse>().is_some());
    assert_eq!(replies[0].header().correlation_id, 4);
    assert_eq!(error_code(&replies[1]), Some(11));
    assert_eq!(replies[1].header().correlation_id, 4);
    let ids: Vec<i64> = replies.iter().map(|r| r.header().message_id).collect();
    assert_eq!(ids, [3, 5]);
}

#[tokio::test]
async fn chunked_request_is_reassembled_before_dispatch() {
    let store = Store::default();
    let mut connection = EtpConnection::new(&ConnectionConfig::default(), registry(&store));
    open(&mut connection).await;

    let object = blob_object(4_000);
    let request = Message::from_body(PutDataObjects {
        data_objects: BTreeMap::from([("0".to_owned(), object.clone())]),
        prune_contained_objects: false,
    })
    .with_message_id(4)
    .with_flags(MessageFlags::FINALPART);
    let sender_ids = MessageIdCounter::starting_at(6);
    let frames = request.encode_frames(NonZeroUsize::new(600), &sender_ids);
    assert!(frames.len() > 2);

    let mut replies = Vec::new();
    for frame in &frames {
        replies.extend(connection.handle_bytes(frame).await.expect("no connection error"));
    }

    assert_eq!(replies.len(), 1);
    assert_eq!(connection.pending_multipart(), 0);
    let reply = Message::decode(&replies[0]).expect("decodes").expect("complete");
    assert!(reply.body_as::<PutDataObjectsResponse>().is_some());
    assert_eq!(reply.header().correlation_id, 4);

    let received = store.received.lock().expect("lock not poisoned");
    let Some(Body::PutDataObjects(put)) = received.first() else {
        panic!("store saw {received:?}");
    };
    assert_eq!(put.data_objects["0"], object);
}

#[rstest]
#[tokio::test]
async fn unanswered_reassembly_reports_invalid_message(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let blob_id = Uuid::new_v4();
    let mut referenced = blob_object(0);
    referenced.blob_id = Some(blob_id);
    let referencer = Message::from_body(GetDataObjectsResponse {
        data_objects: BTreeMap::from([("0".to_owned(), referenced)]),
    })
    .with_message_id(10)
    .with_correlation_id(1)
    .with_flags(MessageFlags::MULTIPART);
    let chunk = Message::from_body(Chunk {
        blob_id,
        data: b"payload".to_vec(),
        final_chunk: true,
    })
    .with_message_id(12)
    .with_correlation_id(1)
    .with_flags(MessageFlags::MULTIPART_AND_FINALPART);

    assert!(connection.handle_message(Some(referencer)).await.expect("cached").is_empty());
    assert_eq!(connection.pending_multipart(), 1);
    let replies = connection.handle_message(Some(chunk)).await.expect("no connection error");

    assert_eq!(replies.len(), 1);
    assert_eq!(error_code(&replies[0]), Some(19));
    assert_eq!(connection.pending_multipart(), 0);
}

#[rstest]
#[tokio::test]
async fn chunks_without_referencer_are_a_connection_error(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let orphan = Message::from_body(Chunk::default())
        .with_message_id(8)
        .with_correlation_id(6)
        .with_flags(MessageFlags::MULTIPART_AND_FINALPART);

    let result = connection.handle_message(Some(orphan)).await;

    assert!(matches!(
        result,
        Err(ConnectionError::MissingReferencer { correlation_id: 6 })
    ));
    assert_eq!(connection.pending_multipart(), 0);
}

#[tokio::test]
async fn stale_assemblies_are_purged_after_negotiated_timeout() {
    let mut connection = server_with(&ConnectionConfig::default().capability("MultipartMessageTimeoutPeriod", 60_i64));
    open(&mut connection).await;
    let partial = Message::from_body(Chunk::default())
        .with_message_id(8)
        .with_correlation_id(6)
        .with_flags(MessageFlags::MULTIPART);
    connection.handle_message(Some(partial)).await.expect("cached");

    let now = Instant::now();
    assert_eq!(connection.purge_expired_multipart(now), 0);
    assert_eq!(connection.purge_expired_multipart(now + Duration::from_secs(61)), 1);
    assert_eq!(connection.pending_multipart(), 0);
}

#[tokio::test]
async fn open_assemblies_are_capped_by_max_concurrent_multipart() {
    let mut connection = server_with(&ConnectionConfig::default().capability("MaxConcurrentMultipart", 1_i64));
    open(&mut connection).await;
    let part = |id: i64| {
        Message::from_body(Chunk::default())
            .with_message_id(id)
            .with_flags(MessageFlags::MULTIPART)
    };
    let continued = Message::from_body(Chunk::default())
        .with_message_id(12)
        .with_correlation_id(8)
        .with_flags(MessageFlags::MULTIPART);

    assert!(connection.handle_message(Some(part(8))).await.expect("cached").is_empty());
    let replies = connection.handle_message(Some(part(10))).await.expect("refused");
    assert!(connection.handle_message(Some(continued)).await.expect("cached").is_empty());

    assert_eq!(replies.len(), 1);
    assert_eq!(error_code(&replies[0]), Some(12));
    assert_eq!(replies[0].header().correlation_id, 10);
    assert_eq!(connection.pending_multipart(), 1);
}

#[rstest]
#[tokio::test]
async fn purge_is_inert_without_timeout_capability(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let partial = Message::from_body(Chunk::default())
        .with_message_id(8)
        .with_flags(MessageFlags::MULTIPART);
    connection.handle_message(Some(partial)).await.expect("cached");

    assert_eq!(
        connection.purge_expired_multipart(Instant::now() + Duration::from_secs(86_400)),
        0
    );
    assert_eq!(connection.pending_multipart(), 1);
}

#[rstest]
fn prepare_outbound_pairs_frames_with_the_request_id(#[from(server)] mut connection: EtpConnection) {
    let error = EtpError::NotFound.to_message(0, 0);
    let frames = connection.prepare_outbound(Some(Message::from_body(Ping::default())), Some(error));

    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|(id, _)| *id == 1));
    let message = Message::decode(&frames[0].1).expect("decodes").expect("complete");
    assert_eq!(message.header().message_id, 1);
    assert!(message.is_final());

    let only_error = connection.prepare_outbound(None, Some(EtpError::NotFound.to_message(0, 0)));
    assert_eq!(only_error.len(), 1);
    assert_eq!(only_error[0].0, 3);
}

#[rstest]
#[tokio::test]
async fn ids_advance_by_two_across_exchanges(#[from(server)] mut connection: EtpConnection) {
    open(&mut connection).await;
    let mut ids = vec![1];
    for request_id in [4_i64, 6, 8] {
        let ping = Message::from_body(Ping::default())
            .with_message_id(request_id)
            .with_flags(MessageFlags::ACKNOWLEDGE);
        for reply in connection.handle_message(Some(ping)).await.expect("no connection error") {
            ids.push(reply.header().message_id);
        }
    }
    assert_eq!(ids, [1, 3, 5, 7, 9, 11, 13]);
}

#[test]
fn roles_serialize_lowercase() {
    assert_eq!(ConnectionRole::Client.as_str(), "client");
    assert_eq!(ConnectionRole::default(), ConnectionRole::Server);
}
