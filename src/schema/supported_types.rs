//! SupportedTypes (protocol 25): discover the data model of a store.

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{ContextScopeKind, SupportedType},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetSupportedTypes {
    pub uri: String,
    pub scope: ContextScopeKind,
    pub return_empty_types: bool,
    pub count_objects: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetSupportedTypesResponse {
    pub supported_types: Vec<SupportedType>,
}

message_types! {
    25 => {
        GetSupportedTypes = 1,
        GetSupportedTypesResponse = 2,
    }
}

impl Collections for GetSupportedTypes {}
collections!(GetSupportedTypesResponse, supported_types);
