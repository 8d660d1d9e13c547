//! GrowingObjectNotification (protocol 7): push part changes of growing
//! data objects to subscribers.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{IndexInterval, ObjectChangeKind, ObjectPart, PartSubscriptionInfo, Uuid},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PartsChanged {
    pub uri: String,
    pub request_uuid: Uuid,
    pub change_kind: ObjectChangeKind,
    pub change_time: i64,
    pub format: String,
    pub parts: Vec<ObjectPart>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PartsDeleted {
    pub uri: String,
    pub request_uuid: Uuid,
    pub change_time: i64,
    pub uids: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct UnsubscribePartNotification {
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct PartsReplacedByRange {
    pub uri: String,
    pub request_uuid: Uuid,
    pub change_time: i64,
    pub deleted_interval: IndexInterval,
    pub include_overlapping_intervals: bool,
    pub format: String,
    pub parts: Vec<ObjectPart>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscribePartNotifications {
    pub request: BTreeMap<String, PartSubscriptionInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct PartSubscriptionEnded {
    pub reason: String,
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct UnsolicitedPartNotifications {
    pub subscriptions: Vec<PartSubscriptionInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscribePartNotificationsResponse {
    pub success: BTreeMap<String, String>,
}

message_types! {
    7 => {
        PartsChanged = 2,
        PartsDeleted = 3,
        UnsubscribePartNotification = 4,
        PartsReplacedByRange = 6,
        SubscribePartNotifications = 7,
        PartSubscriptionEnded = 8,
        UnsolicitedPartNotifications = 9,
        SubscribePartNotificationsResponse = 10,
    }
}

collections!(PartsChanged, parts);
collections!(PartsDeleted, uids);
impl Collections for UnsubscribePartNotification {}
collections!(PartsReplacedByRange, parts);
collections!(SubscribePartNotifications, request);
impl Collections for PartSubscriptionEnded {}
collections!(UnsolicitedPartNotifications, subscriptions);
collections!(SubscribePartNotificationsResponse, success);
