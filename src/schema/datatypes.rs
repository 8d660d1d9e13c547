//! Shared ETP records referenced by the protocol message bodies.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Raw 16-byte ETP UUID.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct Uuid(pub [u8; 16]);

impl Uuid {
    /// Generate a random (version 4) identifier.
    #[must_use]
    pub fn new_v4() -> Self { Self(*uuid::Uuid::new_v4().as_bytes()) }

    /// Return the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] { &self.0 }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        uuid::Uuid::from_bytes(self.0).fmt(f)
    }
}

/// Protocol version quadruple, e.g. `1.2.0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub revision: i32,
    pub patch: i32,
}

impl Version {
    /// The protocol version implemented by this crate.
    pub const ETP12: Self = Self {
        major: 1,
        minor: 2,
        revision: 0,
        patch: 0,
    };
}

/// Loosely typed value used for capabilities and custom data.
///
/// Serialized untagged so that configuration files can spell capability
/// values as plain scalars.
#[derive(Clone, Debug, PartialEq, Encode, Decode, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Float(f32),
    String(String),
    ArrayOfLong(Vec<i64>),
    ArrayOfDouble(Vec<f64>),
    ArrayOfString(Vec<String>),
    Bytes(Vec<u8>),
}

impl DataValue {
    /// Integer view of the value, if it is an integral number.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(i64::from(*v)),
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating point view of any numeric value.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "capability values stay far below 2^52")]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(f64::from(*v)),
            Self::Long(v) => Some(*v as f64),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Long(_) | Self::Float(_) | Self::Double(_)
        )
    }

    /// Order two values of the same kind.
    ///
    /// Numbers compare with numbers, booleans with booleans and strings with
    /// strings. Any other pairing is incomparable and yields `None`.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self { Self::Boolean(value) }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self { Self::Int(value) }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self { Self::Long(value) }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self { Self::Double(value) }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self { Self::String(value.to_owned()) }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self { Self::String(value) }
}

/// Named values keyed by capability or custom-data name.
pub type DataValueMap = BTreeMap<String, DataValue>;

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct SupportedProtocol {
    pub protocol: i32,
    pub protocol_version: Version,
    pub role: String,
    pub protocol_capabilities: DataValueMap,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct SupportedDataObject {
    pub qualified_type: String,
    pub data_object_capabilities: DataValueMap,
}

/// Error payload of a `ProtocolException`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ErrorInfo {
    pub message: String,
    pub code: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum ActiveStatusKind {
    #[default]
    Active,
    Inactive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum RelationshipKind {
    #[default]
    Primary,
    Secondary,
    Both,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum ContextScopeKind {
    #[default]
    SelfOnly,
    Sources,
    Targets,
    SourcesOrSelf,
    TargetsOrSelf,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct Resource {
    pub uri: String,
    pub alternate_uris: Vec<String>,
    pub name: String,
    pub source_count: Option<i32>,
    pub target_count: Option<i32>,
    pub last_changed: i64,
    pub store_last_write: i64,
    pub store_created: i64,
    pub active_status: ActiveStatusKind,
    pub custom_data: DataValueMap,
}

/// A data object with either inline `data` or a `blob_id` naming the chunk
/// stream that carries its payload.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct DataObject {
    pub resource: Resource,
    pub format: String,
    pub blob_id: Option<Uuid>,
    pub data: Vec<u8>,
}

impl DataObject {
    /// Whether the payload travels out of band in chunk messages.
    #[must_use]
    pub fn is_blob_reference(&self) -> bool { self.blob_id.is_some() && self.data.is_empty() }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ContextInfo {
    pub uri: String,
    pub depth: i32,
    pub data_object_types: Vec<String>,
    pub navigable_edges: RelationshipKind,
    pub include_secondary_targets: bool,
    pub include_secondary_sources: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct Dataspace {
    pub uri: String,
    pub path: String,
    pub store_last_write: i64,
    pub store_created: i64,
    pub custom_data: DataValueMap,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct Edge {
    pub source_uri: String,
    pub target_uri: String,
    pub relationship_kind: RelationshipKind,
    pub custom_data: DataValueMap,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct DeletedResource {
    pub uri: String,
    pub deleted_time: i64,
    pub custom_data: DataValueMap,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SupportedType {
    pub data_object_type: String,
    pub object_count: Option<i32>,
    pub relationship_kind: RelationshipKind,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PutResponse {
    pub created_contained_object_uris: Vec<String>,
    pub deleted_contained_object_uris: Vec<String>,
    pub joined_contained_object_uris: Vec<String>,
    pub unjoined_contained_object_uris: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ArrayOfString {
    pub values: Vec<String>,
}

/// Position along a channel or growing-object index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Encode, Decode)]
pub enum IndexValue {
    #[default]
    Null,
    Long(i64),
    Double(f64),
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct IndexInterval {
    pub start_index: IndexValue,
    pub end_index: IndexValue,
    pub uom: String,
    pub depth_datum: String,
}

/// One part of a growing data object, e.g. a log row or trajectory station.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ObjectPart {
    pub uid: String,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum ObjectChangeKind {
    #[default]
    Insert,
    Update,
    Authorized,
    Joined,
    Unjoined,
    JoinedSubscription,
    UnjoinedSubscription,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ObjectChange {
    pub change_kind: ObjectChangeKind,
    pub change_time: i64,
    pub data_object: DataObject,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChangeAnnotation {
    pub change_time: i64,
    pub interval: IndexInterval,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChangeResponseInfo {
    pub response_timestamp: i64,
    pub changes: Vec<ChangeAnnotation>,
}

/// Scope and options of a notification subscription.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscriptionInfo {
    pub context: ContextInfo,
    pub scope: ContextScopeKind,
    pub request_uuid: Uuid,
    pub include_object_data: bool,
    pub format: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PartSubscriptionInfo {
    pub uri: String,
    pub request_uuid: Uuid,
    pub include_object_data: bool,
    pub format: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum ChannelIndexKind {
    #[default]
    DateTime,
    ElapsedTime,
    MeasuredDepth,
    TrueVerticalDepth,
    PassIndexedDepth,
    Pressure,
    Temperature,
    Scalar,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum IndexDirection {
    #[default]
    Increasing,
    Decreasing,
    Unordered,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct IndexMetadataRecord {
    pub index_kind: ChannelIndexKind,
    pub interval: IndexInterval,
    pub direction: IndexDirection,
    pub name: String,
    pub uom: String,
    pub depth_datum: String,
    pub filterable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct PartsMetadataInfo {
    pub uri: String,
    pub name: String,
    pub index: IndexMetadataRecord,
    pub custom_data: DataValueMap,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChannelMetadataRecord {
    pub uri: String,
    pub id: i64,
    pub indexes: Vec<IndexMetadataRecord>,
    pub channel_name: String,
    pub uom: String,
    pub depth_datum: String,
    pub channel_class_uri: String,
    pub status: ActiveStatusKind,
    pub source: String,
    pub measure_class: String,
    pub custom_data: DataValueMap,
}

/// A channel value at one index position.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct DataItem {
    pub channel_id: i64,
    pub indexes: Vec<IndexValue>,
    pub value: Option<DataValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChannelSubscribeInfo {
    pub channel_id: i64,
    pub start_index: IndexValue,
    pub data_changes: bool,
    pub request_latest_index_count: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChannelRangeInfo {
    pub channel_ids: Vec<i64>,
    pub interval: IndexInterval,
    pub secondary_intervals: Vec<IndexInterval>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ChannelChangeRequestInfo {
    pub since_change_time: i64,
    pub channel_ids: Vec<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct TruncateInfo {
    pub channel_id: i64,
    pub new_end_index: IndexValue,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct OpenChannelInfo {
    pub metadata: ChannelMetadataRecord,
    pub prefer_realtime: bool,
    pub data_changes: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct FrameChannelMetadataRecord {
    pub uri: String,
    pub channel_name: String,
    pub uom: String,
    pub depth_datum: String,
    pub channel_class_uri: String,
    pub status: ActiveStatusKind,
    pub custom_data: DataValueMap,
}

/// One row of a frame: the index values and one point per requested channel.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct FrameRow {
    pub indexes: Vec<IndexValue>,
    pub points: Vec<Option<DataValue>>,
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use rstest::rstest;

    use super::{DataValue, Uuid};

    #[rstest]
    #[case(DataValue::Int(5), DataValue::Long(7), Some(Ordering::Less))]
    #[case(DataValue::Long(9), DataValue::Double(2.5), Some(Ordering::Greater))]
    #[case(DataValue::Boolean(true), DataValue::Boolean(false), Some(Ordering::Greater))]
    #[case(DataValue::from("a"), DataValue::from("b"), Some(Ordering::Less))]
    #[case(DataValue::Boolean(true), DataValue::Int(1), None)]
    #[case(DataValue::Null, DataValue::Null, None)]
    fn compare_only_orders_like_kinds(
        #[case] a: DataValue,
        #[case] b: DataValue,
        #[case] expected: Option<Ordering>,
    ) {
        assert_eq!(a.compare(&b), expected);
    }

    #[test]
    fn generated_uuids_differ() {
        assert_ne!(Uuid::new_v4(), Uuid::new_v4());
    }

    #[test]
    fn uuid_displays_hyphenated() {
        let text = Uuid([0xab; 16]).to_string();
        assert_eq!(text, "abababab-abab-abab-abab-abababababab");
    }
}
