//! Outbound splitting under a negotiated frame limit, and inbound
//! reassembly of chunked data objects.

use std::collections::BTreeMap;

use bytes::Bytes;
use etp_testing::{
    ExampleDiscovery,
    ExampleHandlers,
    client,
    decode_frames,
    drive_frames,
    error_code,
    registry_with,
    request_session,
    resource,
};
use etpproto::{
    capability::EndpointCapabilityKind,
    config::ConnectionConfig,
    connection::EtpConnection,
    message::{Message, MessageFlags},
    schema::{
        datatypes::{DataObject, DataValue, Resource},
        discovery::{GetResources, GetResourcesResponse},
        store::{PutDataObjects, PutDataObjectsResponse},
    },
};
use rstest::rstest;

const FRAME_LIMIT: i64 = 1024;

fn limit() -> [(&'static str, DataValue); 1] {
    [(
        EndpointCapabilityKind::MaxWebSocketMessagePayloadSize.name(),
        DataValue::Long(FRAME_LIMIT),
    )]
}

fn server_with(handlers: &ExampleHandlers) -> EtpConnection {
    EtpConnection::new(&ConnectionConfig::default(), registry_with(handlers))
}

/// Open `server` with the frame limit and return the `OpenSession` frames.
async fn open_limited(server: &mut EtpConnection) -> Vec<Bytes> {
    let open = request_session(2, &limit()).encode().expect("encode RequestSession");
    let frames = server.handle_bytes(&open).await.expect("no connection error");
    assert_eq!(server.client_info().max_frame_size().map(|n| n.get()), Some(1024));
    frames
}

fn get_resources(message_id: i64) -> Bytes {
    Message::from_body(GetResources::default())
        .with_message_id(message_id)
        .with_flags(MessageFlags::FINALPART)
        .encode()
        .expect("encode GetResources")
}

#[tokio::test]
async fn large_lists_are_split_under_the_limit() {
    let count = 200;
    let mut server = server_with(&ExampleHandlers {
        discovery: ExampleDiscovery { count },
        ..ExampleHandlers::default()
    });
    open_limited(&mut server).await;

    let frames = server
        .handle_bytes(&get_resources(4))
        .await
        .expect("no connection error");

    assert!(frames.len() > 1, "expected several parts");
    assert!(frames.iter().all(|f| f.len() <= 1024), "a part exceeds the limit");
    let parts = decode_frames(&frames);
    assert!(parts.iter().all(Message::is_multipart));
    assert!(parts.iter().all(|m| m.header().correlation_id == 4));
    let finals: Vec<_> = parts.iter().map(Message::is_final).collect();
    assert_eq!(finals.iter().filter(|f| **f).count(), 1);
    assert_eq!(finals.last(), Some(&true));

    let received: Vec<Resource> = parts
        .iter()
        .filter_map(|m| m.body_as::<GetResourcesResponse>())
        .flat_map(|body| body.resources.iter().cloned())
        .collect();
    let expected: Vec<Resource> = (0..count).map(resource).collect();
    assert_eq!(received, expected);
}

#[tokio::test]
async fn unsplittable_replies_become_max_size_exceeded() {
    let mut server = server_with(&ExampleHandlers::default());
    open_limited(&mut server).await;
    let big = Message::from_body(GetResourcesResponse {
        resources: vec![Resource {
            uri: "x".repeat(4096),
            ..Resource::default()
        }],
    })
    .with_correlation_id(4);

    let frames = server.encode_outbound(&big);

    let replies = decode_frames(&frames);
    assert_eq!(replies.len(), 1);
    assert_eq!(error_code(&replies[0]), Some(17));
    assert_eq!(replies[0].header().correlation_id, 4);
    assert!(replies[0].is_final());
}

#[rstest]
#[tokio::test]
async fn chunked_objects_reach_the_store_intact(mut client: EtpConnection) {
    let handlers = ExampleHandlers::default();
    let mut server = server_with(&handlers);
    let open = open_limited(&mut server).await;
    let replies = drive_frames(&mut client, &open).await;
    assert!(replies.is_empty());
    assert!(client.is_connected());
    assert_eq!(client.client_info().max_frame_size().map(|n| n.get()), Some(1024));

    let payload: Vec<u8> = (0..=250_u8).cycle().take(3000).collect();
    let uri = "eml:///dataspace('demo')/witsml20.Well(1)".to_owned();
    let object = DataObject {
        resource: Resource {
            uri: uri.clone(),
            ..Resource::default()
        },
        format: "xml".to_owned(),
        data: payload.clone(),
        ..DataObject::default()
    };
    let put = Message::from_body(PutDataObjects {
        data_objects: BTreeMap::from([("0".to_owned(), object)]),
        prune_contained_objects: false,
    });
    let outbound = client.prepare_outbound(Some(put), None);
    assert!(outbound.len() > 2, "expected a referencer and several chunks");
    assert!(outbound.iter().all(|(id, _)| *id == outbound[0].0));
    let frames: Vec<Bytes> = outbound.into_iter().map(|(_, frame)| frame).collect();
    assert!(frames.iter().all(|f| f.len() <= 1024));

    let replies = drive_frames(&mut server, &frames).await;

    assert_eq!(replies.len(), 1);
    assert!(replies[0].body_as::<PutDataObjectsResponse>().is_some());
    assert_eq!(server.pending_multipart(), 0);
    let stored = handlers.store.get(&uri).expect("object stored");
    assert_eq!(stored.data, payload);
    assert_eq!(stored.blob_id, None);
}
