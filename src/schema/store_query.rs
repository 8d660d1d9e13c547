//! StoreQuery (protocol 14): query data objects of a store.

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{ActiveStatusKind, ContextInfo, ContextScopeKind, DataObject, Uuid},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct FindDataObjects {
    pub context: ContextInfo,
    pub scope: ContextScopeKind,
    pub store_last_write_filter: Option<i64>,
    pub active_status_filter: Option<ActiveStatusKind>,
    pub format: String,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct FindDataObjectsResponse {
    pub data_objects: Vec<DataObject>,
    pub server_sort_order: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Chunk {
    pub blob_id: Uuid,
    pub data: Vec<u8>,
    pub final_chunk: bool,
}

message_types! {
    14 => {
        FindDataObjects = 1,
        FindDataObjectsResponse = 2,
        Chunk = 3,
    }
}

impl Collections for FindDataObjects {}
collections!(FindDataObjectsResponse, data_objects, chunkable);
impl Collections for Chunk {}
