//! Discovery (protocol 3): enumerate resources and edges of a store.

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{ActiveStatusKind, ContextInfo, ContextScopeKind, DeletedResource, Edge, Resource},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetResources {
    pub context: ContextInfo,
    pub scope: ContextScopeKind,
    pub count_objects: bool,
    pub store_last_write_filter: Option<i64>,
    pub active_status_filter: Option<ActiveStatusKind>,
    pub include_edges: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetResourcesResponse {
    pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetDeletedResources {
    pub dataspace_uri: String,
    pub delete_time_filter: Option<i64>,
    pub data_object_types: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetDeletedResourcesResponse {
    pub deleted_resources: Vec<DeletedResource>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetResourcesEdgesResponse {
    pub edges: Vec<Edge>,
}

message_types! {
    3 => {
        GetResources = 1,
        GetResourcesResponse = 4,
        GetDeletedResources = 5,
        GetDeletedResourcesResponse = 6,
        GetResourcesEdgesResponse = 7,
    }
}

impl Collections for GetResources {}
collections!(GetResourcesResponse, resources);
collections!(GetDeletedResources, data_object_types);
collections!(GetDeletedResourcesResponse, deleted_resources);
collections!(GetResourcesEdgesResponse, edges);
