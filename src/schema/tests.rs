use std::collections::{BTreeMap, HashSet};

use rstest::rstest;

use super::{
    BODY_TYPES,
    Body,
    core::{Acknowledge, CloseSession, OpenSession, ProtocolException},
    datatypes::{DataObject, Uuid},
    discovery::GetResourcesResponse,
    store::{GetDataObjects, GetDataObjectsResponse, PutDataObjectsResponse},
    store_query::FindDataObjectsResponse,
};

fn object(data: &[u8]) -> DataObject {
    DataObject {
        format: "xml".to_owned(),
        data: data.to_vec(),
        ..DataObject::default()
    }
}

#[test]
fn catalog_keys_are_unique() {
    let keys: HashSet<_> = BODY_TYPES
        .iter()
        .map(|entry| (entry.protocol, entry.message_type))
        .collect();
    assert_eq!(keys.len(), BODY_TYPES.len());
}

#[rstest]
#[case(Body::from(GetDataObjects::default()), true)]
#[case(Body::from(GetDataObjectsResponse::default()), true)]
#[case(Body::from(PutDataObjectsResponse::default()), true)]
#[case(Body::from(GetResourcesResponse::default()), true)]
#[case(Body::from(OpenSession::default()), false)]
#[case(Body::from(CloseSession::default()), false)]
#[case(Body::from(ProtocolException::default()), false)]
#[case(Body::from(Acknowledge::default()), false)]
fn plural_follows_type_name(#[case] body: Body, #[case] plural: bool) {
    assert_eq!(body.is_plural(), plural, "{}", body.type_name());
}

#[test]
fn chunk_bodies_share_a_name() {
    let store = Body::new_chunk(4, Uuid::default(), vec![1], false).expect("store chunk");
    let query = Body::new_chunk(14, Uuid::default(), vec![1], true).expect("query chunk");

    assert!(store.is_chunk());
    assert!(query.is_chunk());
    assert_eq!(store.message_type(), 8);
    assert_eq!(query.message_type(), 3);
    assert!(Body::new_chunk(3, Uuid::default(), Vec::new(), false).is_none());
}

#[test]
fn split_off_partitions_map_in_key_order() {
    let data_objects: BTreeMap<_, _> = ["a", "b", "c"]
        .into_iter()
        .map(|key| (key.to_owned(), object(key.as_bytes())))
        .collect();
    let mut body = Body::from(GetDataObjectsResponse { data_objects });

    let rest = body.split_off(2).expect("cuttable");

    let Body::GetDataObjectsResponse(head) = &body else {
        panic!("unexpected body {body:?}");
    };
    let Body::GetDataObjectsResponse(tail) = &rest else {
        panic!("unexpected body {rest:?}");
    };
    assert_eq!(head.data_objects.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(tail.data_objects.keys().collect::<Vec<_>>(), ["c"]);
}

#[test]
fn split_off_keeps_non_collection_fields_on_both_halves() {
    let mut body = Body::from(FindDataObjectsResponse {
        data_objects: vec![object(b"1"), object(b"2")],
        server_sort_order: "uri".to_owned(),
    });

    let rest = body.split_off(1).expect("cuttable");

    for part in [&body, &rest] {
        let Body::FindDataObjectsResponse(response) = part else {
            panic!("unexpected body {part:?}");
        };
        assert_eq!(response.server_sort_order, "uri");
        assert_eq!(response.data_objects.len(), 1);
    }
}

#[test]
fn absorb_merges_maps_and_rejects_other_types() {
    let mut first = Body::from(GetDataObjectsResponse {
        data_objects: BTreeMap::from([("a".to_owned(), object(b"1"))]),
    });
    let second = Body::from(GetDataObjectsResponse {
        data_objects: BTreeMap::from([("b".to_owned(), object(b"2"))]),
    });

    first.absorb(second).expect("same type");
    assert_eq!(first.data_objects().map(|objects| objects.len()), Some(2));

    let rejected = first.absorb(Body::from(Acknowledge::default()));
    assert!(rejected.is_err());
}

#[test]
fn only_data_object_bodies_are_chunkable() {
    assert!(Body::from(GetDataObjectsResponse::default()).is_chunkable());
    assert!(Body::from(FindDataObjectsResponse::default()).is_chunkable());
    assert!(!Body::from(GetDataObjects::default()).is_chunkable());
    assert!(!Body::from(GetResourcesResponse::default()).is_chunkable());
}
