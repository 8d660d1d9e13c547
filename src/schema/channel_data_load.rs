//! ChannelDataLoad (protocol 22): a producer pushes channel data into a
//! store.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{DataItem, IndexInterval, OpenChannelInfo, TruncateInfo},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct OpenChannels {
    pub uris: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct OpenChannelsResponse {
    pub channels: BTreeMap<String, OpenChannelInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CloseChannels {
    pub id: BTreeMap<String, i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ChannelData {
    pub data: Vec<DataItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ReplaceRange {
    pub change_time: i64,
    pub channel_ids: Vec<i64>,
    pub changed_interval: IndexInterval,
    pub data: Vec<DataItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ChannelsClosed {
    pub reason: String,
    pub id: BTreeMap<String, i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ReplaceRangeResponse {
    pub channel_change_time: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct TruncateChannels {
    pub channels: BTreeMap<String, TruncateInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct TruncateChannelsResponse {
    pub channels_truncated_time: BTreeMap<String, i64>,
}

message_types! {
    22 => {
        OpenChannels = 1,
        OpenChannelsResponse = 2,
        CloseChannels = 3,
        ChannelData = 4,
        ReplaceRange = 6,
        ChannelsClosed = 7,
        ReplaceRangeResponse = 8,
        TruncateChannels = 9,
        TruncateChannelsResponse = 10,
    }
}

collections!(OpenChannels, uris);
collections!(OpenChannelsResponse, channels);
collections!(CloseChannels, id);
collections!(ChannelData, data);
collections!(ReplaceRange, channel_ids);
collections!(ChannelsClosed, id);
impl Collections for ReplaceRangeResponse {}
collections!(TruncateChannels, channels);
collections!(TruncateChannelsResponse, channels_truncated_time);
