//! GrowingObject (protocol 6): read and edit the parts of growing data
//! objects such as logs and trajectories.
//!
//! Parts are opaque payloads in the object's `format`; the header of the
//! object travels as a regular [`DataObject`].

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{ChangeResponseInfo, DataObject, IndexInterval, ObjectPart, PartsMetadataInfo},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct DeleteParts {
    pub uri: String,
    pub uids: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetParts {
    pub uri: String,
    pub format: String,
    pub uids: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetPartsByRange {
    pub uri: String,
    pub format: String,
    pub index_interval: IndexInterval,
    pub include_overlapping_intervals: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PutParts {
    pub uri: String,
    pub format: String,
    pub parts: BTreeMap<String, ObjectPart>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetPartsResponse {
    pub uri: String,
    pub format: String,
    pub parts: BTreeMap<String, ObjectPart>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ReplacePartsByRange {
    pub uri: String,
    pub delete_interval: IndexInterval,
    pub include_overlapping_intervals: bool,
    pub format: String,
    pub parts: Vec<ObjectPart>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetPartsMetadata {
    pub uris: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetPartsMetadataResponse {
    pub metadata: BTreeMap<String, PartsMetadataInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetPartsByRangeResponse {
    pub uri: String,
    pub format: String,
    pub parts: Vec<ObjectPart>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct DeletePartsResponse {
    pub success: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ReplacePartsByRangeResponse {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PutPartsResponse {
    pub success: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetGrowingDataObjectsHeader {
    pub uris: BTreeMap<String, String>,
    pub format: String,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetGrowingDataObjectsHeaderResponse {
    pub data_objects: BTreeMap<String, DataObject>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct PutGrowingDataObjectsHeader {
    pub data_objects: BTreeMap<String, DataObject>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PutGrowingDataObjectsHeaderResponse {
    pub success: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetChangeAnnotations {
    pub since_change_time: i64,
    pub uris: BTreeMap<String, String>,
    pub latest_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetChangeAnnotationsResponse {
    pub changes: BTreeMap<String, ChangeResponseInfo>,
}

message_types! {
    6 => {
        DeleteParts = 1,
        GetParts = 3,
        GetPartsByRange = 4,
        PutParts = 5,
        GetPartsResponse = 6,
        ReplacePartsByRange = 7,
        GetPartsMetadata = 8,
        GetPartsMetadataResponse = 9,
        GetPartsByRangeResponse = 10,
        DeletePartsResponse = 11,
        ReplacePartsByRangeResponse = 12,
        PutPartsResponse = 13,
        GetGrowingDataObjectsHeader = 14,
        GetGrowingDataObjectsHeaderResponse = 15,
        PutGrowingDataObjectsHeader = 16,
        PutGrowingDataObjectsHeaderResponse = 17,
        GetChangeAnnotations = 19,
        GetChangeAnnotationsResponse = 20,
    }
}

collections!(DeleteParts, uids);
collections!(GetParts, uids);
impl Collections for GetPartsByRange {}
collections!(PutParts, parts);
collections!(GetPartsResponse, parts);
collections!(ReplacePartsByRange, parts);
collections!(GetPartsMetadata, uris);
collections!(GetPartsMetadataResponse, metadata);
collections!(GetPartsByRangeResponse, parts);
collections!(DeletePartsResponse, success);
impl Collections for ReplacePartsByRangeResponse {}
collections!(PutPartsResponse, success);
collections!(GetGrowingDataObjectsHeader, uris);
collections!(GetGrowingDataObjectsHeaderResponse, data_objects);
collections!(PutGrowingDataObjectsHeader, data_objects);
collections!(PutGrowingDataObjectsHeaderResponse, success);
collections!(GetChangeAnnotations, uris);
collections!(GetChangeAnnotationsResponse, changes);
