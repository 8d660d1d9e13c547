use async_trait::async_trait;
use rstest::rstest;

use super::{
    ChannelDataFrameHandler,
    ChannelDataFrameProtocol,
    ChannelDataLoadHandler,
    ChannelDataLoadProtocol,
    ChannelSubscribeHandler,
    ChannelSubscribeProtocol,
    CoreHandler,
    CoreProtocol,
    DataspaceHandler,
    DataspaceProtocol,
    GrowingObjectHandler,
    GrowingObjectNotificationHandler,
    GrowingObjectNotificationProtocol,
    GrowingObjectProtocol,
    HandlerRegistry,
    ProtocolHandler,
    RegistryError,
    StoreNotificationHandler,
    StoreNotificationProtocol,
    TransactionHandler,
    TransactionProtocol,
};
use crate::{
    client_info::ClientInfo,
    connection::ConnectionRole,
    error::EtpError,
    message::{Message, MessageHeader},
    protocol::CommunicationProtocol,
    response::Response,
    schema::{
        Body,
        channel_data_frame::GetFrame,
        channel_data_load::{ChannelData, OpenChannels},
        channel_subscribe::{GetChangeAnnotations, SubscribeChannels},
        core::{Ping, Pong},
        dataspace::GetDataspaces,
        datatypes::Version,
        growing_object::{GetParts, PutPartsResponse},
        growing_object_notification::SubscribePartNotifications,
        store_notification::SubscribeNotifications,
        transaction::{CommitTransaction, StartTransaction},
    },
};

struct PingOnly;

#[async_trait]
impl CoreHandler for PingOnly {
    async fn on_ping(
        &self,
        ping: Ping,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        Ok(Response::reply(Pong {
            current_date_time: ping.current_date_time,
        }))
    }
}

struct NoDataspaces;

impl DataspaceHandler for NoDataspaces {}

async fn dispatch(handler: &dyn ProtocolHandler, body: Body) -> Result<Response, EtpError> {
    let header = Message::from_body(body.clone()).header().to_owned();
    handler
        .handle(body, &header, &mut ClientInfo::default())
        .await
}

#[tokio::test]
async fn adapter_routes_to_the_matching_method() {
    let response = dispatch(&CoreProtocol(PingOnly), Ping { current_date_time: 42 }.into())
        .await
        .expect("ping handled");
    let Response::Single(reply) = response else {
        panic!("expected single reply, got {response:?}");
    };
    assert_eq!(reply.body_as::<Pong>(), Some(&Pong { current_date_time: 42 }));
}

#[tokio::test]
async fn unimplemented_methods_are_not_supported() {
    let result = dispatch(&DataspaceProtocol(NoDataspaces), GetDataspaces::default().into()).await;
    assert_eq!(result.map(|_| ()), Err(EtpError::NotSupported));
}

/// Implements no method of any protocol.
struct Bare;

impl ChannelDataFrameHandler for Bare {}
impl StoreNotificationHandler for Bare {}
impl GrowingObjectHandler for Bare {}
impl GrowingObjectNotificationHandler for Bare {}
impl TransactionHandler for Bare {}
impl ChannelSubscribeHandler for Bare {}
impl ChannelDataLoadHandler for Bare {}

#[rstest]
#[case::channel_data_frame(Box::new(ChannelDataFrameProtocol(Bare)), CommunicationProtocol::ChannelDataFrame, GetFrame::default().into())]
#[case::store_notification(Box::new(StoreNotificationProtocol(Bare)), CommunicationProtocol::StoreNotification, SubscribeNotifications::default().into())]
#[case::growing_object(Box::new(GrowingObjectProtocol(Bare)), CommunicationProtocol::GrowingObject, GetParts::default().into())]
#[case::growing_object_response(Box::new(GrowingObjectProtocol(Bare)), CommunicationProtocol::GrowingObject, PutPartsResponse::default().into())]
#[case::growing_object_notification(Box::new(GrowingObjectNotificationProtocol(Bare)), CommunicationProtocol::GrowingObjectNotification, SubscribePartNotifications::default().into())]
#[case::transaction(Box::new(TransactionProtocol(Bare)), CommunicationProtocol::Transaction, StartTransaction::default().into())]
#[case::transaction_commit(Box::new(TransactionProtocol(Bare)), CommunicationProtocol::Transaction, CommitTransaction::default().into())]
#[case::channel_subscribe(Box::new(ChannelSubscribeProtocol(Bare)), CommunicationProtocol::ChannelSubscribe, SubscribeChannels::default().into())]
#[case::channel_subscribe_annotations(Box::new(ChannelSubscribeProtocol(Bare)), CommunicationProtocol::ChannelSubscribe, GetChangeAnnotations::default().into())]
#[case::channel_data_load(Box::new(ChannelDataLoadProtocol(Bare)), CommunicationProtocol::ChannelDataLoad, OpenChannels::default().into())]
#[case::channel_data_load_data(Box::new(ChannelDataLoadProtocol(Bare)), CommunicationProtocol::ChannelDataLoad, ChannelData::default().into())]
#[tokio::test]
async fn every_protocol_defaults_to_not_supported(
    #[case] handler: Box<dyn ProtocolHandler>,
    #[case] protocol: CommunicationProtocol,
    #[case] body: Body,
) {
    assert_eq!(body.protocol(), protocol.id());

    let result = dispatch(handler.as_ref(), body).await;

    assert_eq!(result.map(|_| ()), Err(EtpError::NotSupported));
}

#[test]
fn adapters_name_their_protocol() {
    assert_eq!(TransactionProtocol::<Bare>::PROTOCOL, CommunicationProtocol::Transaction);
    assert_eq!(GrowingObjectProtocol::<Bare>::PROTOCOL, CommunicationProtocol::GrowingObject);
    assert_eq!(
        ChannelDataLoadProtocol::<Bare>::PROTOCOL.id(),
        CommunicationProtocol::ChannelDataLoad.id()
    );
}

#[tokio::test]
async fn same_named_bodies_stay_in_their_protocol() {
    let subscribed = crate::schema::channel_subscribe::ChannelData::default();
    let result = dispatch(&ChannelDataLoadProtocol(Bare), subscribed.into()).await;
    assert_eq!(result.map(|_| ()), Err(EtpError::InvalidMessageType));
}

#[tokio::test]
async fn foreign_bodies_are_invalid_message_types() {
    let result = dispatch(&DataspaceProtocol(NoDataspaces), Ping::default().into()).await;
    assert_eq!(result.map(|_| ()), Err(EtpError::InvalidMessageType));
}

#[test]
fn duplicate_protocols_are_rejected() {
    let result = HandlerRegistry::builder()
        .register(CommunicationProtocol::Core, CoreProtocol(PingOnly))
        .and_then(|builder| builder.register(CommunicationProtocol::Core, CoreProtocol(PingOnly)));
    assert!(matches!(
        result,
        Err(RegistryError::DuplicateProtocol(CommunicationProtocol::Core))
    ));
}

#[rstest]
#[case(0, true)]
#[case(24, true)]
#[case(3, false)]
#[case(-7, false)]
fn lookup_by_header_protocol(#[case] protocol: i32, #[case] registered: bool) {
    let registry = HandlerRegistry::builder()
        .register(CommunicationProtocol::Core, CoreProtocol(PingOnly))
        .and_then(|b| b.register(CommunicationProtocol::Dataspace, DataspaceProtocol(NoDataspaces)))
        .expect("distinct protocols")
        .build();
    assert_eq!(registry.get(protocol).is_some(), registered);
}

#[test]
fn supported_protocols_skip_core() {
    let registry = HandlerRegistry::builder()
        .register(CommunicationProtocol::Core, CoreProtocol(PingOnly))
        .and_then(|b| b.register(CommunicationProtocol::Dataspace, DataspaceProtocol(NoDataspaces)))
        .expect("distinct protocols")
        .build();

    let advertised = registry.supported_protocols(ConnectionRole::Server);
    assert_eq!(advertised.len(), 1);
    assert_eq!(advertised[0].protocol, 24);
    assert_eq!(advertised[0].protocol_version, Version::ETP12);
    assert_eq!(advertised[0].role, "server");
    assert_eq!(format!("{registry:?}"), "{Core, Dataspace}");
}
