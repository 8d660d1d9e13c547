//! ChannelDataFrame (protocol 2): read channel data as rows of a frame.

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{FrameChannelMetadataRecord, FrameRow, IndexInterval, IndexMetadataRecord, Uuid},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct GetFrameMetadata {
    pub uri: String,
    pub include_all_channel_secondary_indexes: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetFrameMetadataResponse {
    pub uri: String,
    pub indexes: Vec<IndexMetadataRecord>,
    pub channels: Vec<FrameChannelMetadataRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetFrame {
    pub uri: String,
    pub include_all_channel_secondary_indexes: bool,
    pub requested_interval: IndexInterval,
    pub request_uuid: Uuid,
    pub requested_secondary_intervals: Vec<IndexInterval>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetFrameResponseHeader {
    pub channel_uris: Vec<String>,
    pub indexes: Vec<IndexMetadataRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CancelGetFrame {
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct GetFrameResponseRows {
    pub frame: Vec<FrameRow>,
}

message_types! {
    2 => {
        GetFrameMetadata = 1,
        GetFrameMetadataResponse = 2,
        GetFrame = 3,
        GetFrameResponseHeader = 4,
        CancelGetFrame = 5,
        GetFrameResponseRows = 6,
    }
}

impl Collections for GetFrameMetadata {}
collections!(GetFrameMetadataResponse, indexes);
collections!(GetFrame, requested_secondary_intervals);
collections!(GetFrameResponseHeader, channel_uris);
impl Collections for CancelGetFrame {}
collections!(GetFrameResponseRows, frame);
