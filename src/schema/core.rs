//! Core (protocol 0): session lifecycle, authorization and errors.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{DataValueMap, ErrorInfo, SupportedDataObject, SupportedProtocol, Uuid},
};

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct RequestSession {
    pub application_name: String,
    pub application_version: String,
    pub client_instance_id: Uuid,
    pub requested_protocols: Vec<SupportedProtocol>,
    pub supported_data_objects: Vec<SupportedDataObject>,
    pub supported_compression: Vec<String>,
    pub supported_formats: Vec<String>,
    pub current_date_time: i64,
    pub earliest_retained_change_time: i64,
    pub server_authorization_required: bool,
    pub endpoint_capabilities: DataValueMap,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct OpenSession {
    pub application_name: String,
    pub application_version: String,
    pub server_instance_id: Uuid,
    pub supported_protocols: Vec<SupportedProtocol>,
    pub supported_data_objects: Vec<SupportedDataObject>,
    pub supported_compression: String,
    pub supported_formats: Vec<String>,
    pub current_date_time: i64,
    pub earliest_retained_change_time: i64,
    pub session_id: Uuid,
    pub endpoint_capabilities: DataValueMap,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CloseSession {
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Authorize {
    pub authorization: String,
    pub supplemental_authorization: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct AuthorizeResponse {
    pub success: bool,
    pub challenges: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Ping {
    pub current_date_time: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Pong {
    pub current_date_time: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ProtocolException {
    pub error: Option<ErrorInfo>,
    pub errors: BTreeMap<String, ErrorInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Acknowledge {}

message_types! {
    0 => {
        RequestSession = 1,
        OpenSession = 2,
        CloseSession = 5,
        Authorize = 6,
        AuthorizeResponse = 7,
        Ping = 8,
        Pong = 9,
        ProtocolException = 1000,
        Acknowledge = 1001,
    }
}

impl Collections for RequestSession {}
impl Collections for OpenSession {}
impl Collections for CloseSession {}
impl Collections for Authorize {}
impl Collections for AuthorizeResponse {}
impl Collections for Ping {}
impl Collections for Pong {}
impl Collections for ProtocolException {}
impl Collections for Acknowledge {}
