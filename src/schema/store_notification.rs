//! StoreNotification (protocol 5): push data object changes to subscribers.

use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use super::{
    Collections,
    MessageType,
    datatypes::{ActiveStatusKind, ObjectChange, Resource, SubscriptionInfo, Uuid},
};

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ObjectChanged {
    pub change: ObjectChange,
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ObjectDeleted {
    pub uri: String,
    pub change_time: i64,
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct UnsubscribeNotifications {
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct ObjectAccessRevoked {
    pub uri: String,
    pub change_time: i64,
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscribeNotifications {
    pub request: BTreeMap<String, SubscriptionInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscriptionEnded {
    pub reason: String,
    pub request_uuid: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct UnsolicitedStoreNotifications {
    pub subscriptions: Vec<SubscriptionInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct SubscribeNotificationsResponse {
    pub success: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct ObjectActiveStatusChanged {
    pub active_status: ActiveStatusKind,
    pub change_time: i64,
    pub resource: Resource,
    pub request_uuid: Uuid,
}

message_types! {
    5 => {
        ObjectChanged = 2,
        ObjectDeleted = 3,
        UnsubscribeNotifications = 4,
        ObjectAccessRevoked = 5,
        SubscribeNotifications = 6,
        SubscriptionEnded = 7,
        UnsolicitedStoreNotifications = 8,
        SubscribeNotificationsResponse = 10,
        ObjectActiveStatusChanged = 11,
    }
}

impl Collections for ObjectChanged {}
impl Collections for ObjectDeleted {}
impl Collections for UnsubscribeNotifications {}
impl Collections for ObjectAccessRevoked {}
collections!(SubscribeNotifications, request);
impl Collections for SubscriptionEnded {}
collections!(UnsolicitedStoreNotifications, subscriptions);
collections!(SubscribeNotificationsResponse, success);
impl Collections for ObjectActiveStatusChanged {}
