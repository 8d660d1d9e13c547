//! ChannelSubscribe (protocol 21): stream channel data to a consumer.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{
        ChangeResponseInfo,
        ChannelChangeRequestInfo,
        ChannelMetadataRecord,
        ChannelRangeInfo,
        ChannelSubscribeInfo,
        DataItem,
        ErrorInfo,
        IndexInterval,
        TruncateInfo,
        Uuid,
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetChannelMetadata {
    pub uris: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetChannelMetadataResponse {
    pub metadata: BTreeMap<String, ChannelMetadataRecord>,
    pub errors: BTreeMap<String, ErrorInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct SubscribeChannels {
    pub channels: BTreeMap<String, ChannelSubscribeInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChannelData {
    pub data: Vec<DataItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct RangeReplaced {
    pub change_time: i64,
    pub channel_ids: Vec<i64>,
    pub changed_interval: IndexInterval,
    pub data: Vec<DataItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct UnsubscribeChannels {
    pub channel_ids: BTreeMap<String, i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscriptionsStopped {
    pub reason: String,
    pub channel_ids: BTreeMap<String, i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetRanges {
    pub request_uuid: Uuid,
    pub channel_ranges: Vec<ChannelRangeInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetRangesResponse {
    pub data: Vec<DataItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CancelGetRanges {
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscribeChannelsResponse {
    pub success: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChannelsTruncated {
    pub change_time: i64,
    pub channels: Vec<TruncateInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetChangeAnnotations {
    pub channels: BTreeMap<String, ChannelChangeRequestInfo>,
    pub latest_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetChangeAnnotationsResponse {
    pub changes: BTreeMap<String, ChangeResponseInfo>,
}

message_types! {
    21 => {
        GetChannelMetadata = 1,
        GetChannelMetadataResponse = 2,
        SubscribeChannels = 3,
        ChannelData = 4,
        RangeReplaced = 6,
        UnsubscribeChannels = 7,
        SubscriptionsStopped = 8,
        GetRanges = 9,
        GetRangesResponse = 10,
        CancelGetRanges = 11,
        SubscribeChannelsResponse = 12,
        ChannelsTruncated = 13,
        GetChangeAnnotations = 14,
        GetChangeAnnotationsResponse = 15,
    }
}

collections!(GetChannelMetadata, uris);
collections!(GetChannelMetadataResponse, metadata);
collections!(SubscribeChannels, channels);
collections!(ChannelData, data);
collections!(RangeReplaced, channel_ids);
collections!(UnsubscribeChannels, channel_ids);
collections!(SubscriptionsStopped, channel_ids);
collections!(GetRanges, channel_ranges);
collections!(GetRangesResponse, data);
impl Collections for CancelGetRanges {}
collections!(SubscribeChannelsResponse, success);
collections!(ChannelsTruncated, channels);
collections!(GetChangeAnnotations, channels);
collections!(GetChangeAnnotationsResponse, changes);
