//! Dataspace (protocol 24): manage the dataspaces of a store.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{Collections, MessageType, datatypes::Dataspace};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetDataspaces {
    pub store_last_write_filter: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetDataspacesResponse {
    pub dataspaces: Vec<Dataspace>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct PutDataspaces {
    pub dataspaces: BTreeMap<String, Dataspace>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct DeleteDataspaces {
    pub uris: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct DeleteDataspacesResponse {
    pub success: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PutDataspacesResponse {
    pub success: BTreeMap<String, String>,
}

message_types! {
    24 => {
        GetDataspaces = 1,
        GetDataspacesResponse = 2,
        PutDataspaces = 3,
        DeleteDataspaces = 4,
        DeleteDataspacesResponse = 5,
        PutDataspacesResponse = 6,
    }
}

impl Collections for GetDataspaces {}
collections!(GetDataspacesResponse, dataspaces);
collections!(PutDataspaces, dataspaces);
collections!(DeleteDataspaces, uris);
collections!(DeleteDataspacesResponse, success);
collections!(PutDataspacesResponse, success);
