//! Store (protocol 4): CRUD on data objects, with chunked payloads.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{ArrayOfString, DataObject, PutResponse, Uuid},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetDataObjects {
    pub uris: BTreeMap<String, String>,
    pub format: String,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct PutDataObjects {
    pub data_objects: BTreeMap<String, DataObject>,
    pub prune_contained_objects: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct DeleteDataObjects {
    pub uris: BTreeMap<String, String>,
    pub prune_contained_objects: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetDataObjectsResponse {
    pub data_objects: BTreeMap<String, DataObject>,
}

/// One slice of a data object payload, linked to its referencer by `blob_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Chunk {
    pub blob_id: Uuid,
    pub data: Vec<u8>,
    pub final_chunk: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PutDataObjectsResponse {
    pub success: BTreeMap<String, PutResponse>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct DeleteDataObjectsResponse {
    pub deleted_uris: BTreeMap<String, ArrayOfString>,
}

message_types! {
    4 => {
        GetDataObjects = 1,
        PutDataObjects = 2,
        DeleteDataObjects = 3,
        GetDataObjectsResponse = 4,
        Chunk = 8,
        PutDataObjectsResponse = 9,
        DeleteDataObjectsResponse = 10,
    }
}

collections!(GetDataObjects, uris);
collections!(PutDataObjects, data_objects, chunkable);
collections!(DeleteDataObjects, uris);
collections!(GetDataObjectsResponse, data_objects, chunkable);
impl Collections for Chunk {}
collections!(PutDataObjectsResponse, success);
collections!(DeleteDataObjectsResponse, deleted_uris);
