//! ETP v1.2 message bodies.
//!
//! Every body type records its `(protocol, message type)` pair through
//! [`MessageType`] and its splittable collections through [`Collections`].
//! [`Body`] is the closed sum of all of them and [`BODY_TYPES`] the static
//! table the codec builds its lookup index from.

use std::collections::BTreeMap;

use bincode::{
    Decode,
    config,
    error::{DecodeError, EncodeError},
};

use self::datatypes::{DataObject, Uuid};

/// Identity of a body type on the wire.
pub trait MessageType: Decode<()> + Into<Body> {
    /// Protocol id carried in the message header.
    const PROTOCOL: i32;
    /// Message type id carried in the message header.
    const MESSAGE_TYPE: i32;
    /// Schema name of the body type.
    const NAME: &'static str;
}

/// Access to the collection fields used when fragmenting a message.
///
/// The "cuttable" collection is the first map- or list-valued field of the
/// body. Chunkable bodies additionally expose their data objects.
pub trait Collections: Sized {
    /// Number of entries in the cuttable collection, if the body has one.
    fn cuttable_len(&self) -> Option<usize> { None }

    /// Keep the first `at` cuttable entries and return a copy of the body
    /// holding the remaining ones.
    fn split_off(&mut self, _at: usize) -> Option<Self> { None }

    fn data_objects(&self) -> Option<Vec<&DataObject>> { None }

    fn data_objects_mut(&mut self) -> Option<Vec<&mut DataObject>> { None }

    /// Merge the data objects of `other` into `self`.
    fn absorb(&mut self, _other: Self) {}
}

/// Ordered collection that can be partitioned by position.
pub trait Cut: Sized {
    fn cut_at(&mut self, at: usize) -> Self;
}

impl<V> Cut for BTreeMap<String, V> {
    fn cut_at(&mut self, at: usize) -> Self {
        match self.keys().nth(at).cloned() {
            Some(key) => self.split_off(&key),
            None => Self::new(),
        }
    }
}

impl<T> Cut for Vec<T> {
    fn cut_at(&mut self, at: usize) -> Self { self.split_off(at.min(self.len())) }
}

/// A `data_objects` field, keyed or listed.
pub trait DataObjectSet {
    fn objects(&self) -> Vec<&DataObject>;
    fn objects_mut(&mut self) -> Vec<&mut DataObject>;
    /// Map entries are merged by key, list entries appended.
    fn merge(&mut self, other: Self);
}

impl DataObjectSet for BTreeMap<String, DataObject> {
    fn objects(&self) -> Vec<&DataObject> { self.values().collect() }

    fn objects_mut(&mut self) -> Vec<&mut DataObject> { self.values_mut().collect() }

    fn merge(&mut self, other: Self) { self.extend(other); }
}

impl DataObjectSet for Vec<DataObject> {
    fn objects(&self) -> Vec<&DataObject> { self.iter().collect() }

    fn objects_mut(&mut self) -> Vec<&mut DataObject> { self.iter_mut().collect() }

    fn merge(&mut self, other: Self) { self.extend(other); }
}

macro_rules! message_types {
    ($protocol:literal => { $($ty:ident = $id:literal),+ $(,)? }) => {
        $(
            impl MessageType for $ty {
                const PROTOCOL: i32 = $protocol;
                const MESSAGE_TYPE: i32 = $id;
                const NAME: &'static str = stringify!($ty);
            }
        )+
    };
}

macro_rules! collections {
    (@cut $field:ident) => {
        fn cuttable_len(&self) -> Option<usize> { Some(self.$field.len()) }

        fn split_off(&mut self, at: usize) -> Option<Self> {
            let tail = $crate::schema::Cut::cut_at(&mut self.$field, at);
            let head = ::std::mem::take(&mut self.$field);
            let mut rest = self.clone();
            self.$field = head;
            rest.$field = tail;
            Some(rest)
        }
    };
    ($ty:ident, $field:ident) => {
        impl Collections for $ty {
            collections!(@cut $field);
        }
    };
    ($ty:ident, $field:ident, chunkable) => {
        impl Collections for $ty {
            collections!(@cut $field);

            fn data_objects(&self) -> Option<Vec<&DataObject>> {
                Some($crate::schema::DataObjectSet::objects(&self.$field))
            }

            fn data_objects_mut(&mut self) -> Option<Vec<&mut DataObject>> {
                Some($crate::schema::DataObjectSet::objects_mut(&mut self.$field))
            }

            fn absorb(&mut self, other: Self) {
                $crate::schema::DataObjectSet::merge(&mut self.$field, other.$field);
            }
        }
    };
}

pub mod channel_data_frame;
pub mod channel_data_load;
pub mod channel_subscribe;
pub mod core;
pub mod dataspace;
pub mod datatypes;
pub mod discovery;
pub mod growing_object;
pub mod growing_object_notification;
pub mod store;
pub mod store_notification;
pub mod store_query;
pub mod supported_types;
pub mod transaction;

/// A body did not have the requested type; carries the actual type name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrongBody(pub &'static str);

/// Catalog row describing one body type.
#[derive(Clone, Copy)]
pub struct BodyType {
    pub protocol: i32,
    pub message_type: i32,
    pub name: &'static str,
    pub decode: fn(&[u8]) -> Result<(Body, usize), DecodeError>,
}

impl std::fmt::Debug for BodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyType")
            .field("protocol", &self.protocol)
            .field("message_type", &self.message_type)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn decode_as<T: MessageType>(bytes: &[u8]) -> Result<(Body, usize), DecodeError> {
    let (body, read) = bincode::decode_from_slice::<T, _>(bytes, crate::codec::decode_config())?;
    Ok((body.into(), read))
}

macro_rules! bodies {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// A decoded message body of any known type.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Body {
            $($variant($ty)),+
        }

        impl Body {
            #[must_use]
            pub const fn protocol(&self) -> i32 {
                match self {
                    $(Self::$variant(_) => <$ty as MessageType>::PROTOCOL),+
                }
            }

            #[must_use]
            pub const fn message_type(&self) -> i32 {
                match self {
                    $(Self::$variant(_) => <$ty as MessageType>::MESSAGE_TYPE),+
                }
            }

            /// Schema name of the body, e.g. `GetDataObjectsResponse`.
            #[must_use]
            pub const fn type_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as MessageType>::NAME),+
                }
            }

            /// Append the encoded body to `out`.
            ///
            /// # Errors
            ///
            /// Returns an [`EncodeError`] if bincode rejects the value.
            pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<usize, EncodeError> {
                match self {
                    $(Self::$variant(body) => {
                        bincode::encode_into_std_write(body, out, config::standard())
                    }),+
                }
            }

            #[must_use]
            pub fn cuttable_len(&self) -> Option<usize> {
                match self {
                    $(Self::$variant(body) => body.cuttable_len()),+
                }
            }

            /// Keep the first `at` cuttable entries and return the remainder
            /// as a body of the same type.
            pub fn split_off(&mut self, at: usize) -> Option<Self> {
                match self {
                    $(Self::$variant(body) => body.split_off(at).map(Self::$variant)),+
                }
            }

            #[must_use]
            pub fn data_objects(&self) -> Option<Vec<&DataObject>> {
                match self {
                    $(Self::$variant(body) => body.data_objects()),+
                }
            }

            pub fn data_objects_mut(&mut self) -> Option<Vec<&mut DataObject>> {
                match self {
                    $(Self::$variant(body) => body.data_objects_mut()),+
                }
            }

            /// Merge the data objects of a body of the same type into this one.
            ///
            /// # Errors
            ///
            /// Hands `other` back when its type differs from `self`.
            pub fn absorb(&mut self, other: Self) -> Result<(), Self> {
                match (self, other) {
                    $((Self::$variant(body), Self::$variant(more)) => {
                        body.absorb(more);
                        Ok(())
                    })+
                    (_, other) => Err(other),
                }
            }
        }

        $(
            impl From<$ty> for Body {
                fn from(body: $ty) -> Self { Self::$variant(body) }
            }

            impl<'a> TryFrom<&'a Body> for &'a $ty {
                type Error = WrongBody;

                fn try_from(body: &'a Body) -> Result<Self, WrongBody> {
                    match body {
                        Body::$variant(inner) => Ok(inner),
                        other => Err(WrongBody(other.type_name())),
                    }
                }
            }
        )+

        /// Every body type known to the codec.
        pub static BODY_TYPES: &[BodyType] = &[
            $(BodyType {
                protocol: <$ty as MessageType>::PROTOCOL,
                message_type: <$ty as MessageType>::MESSAGE_TYPE,
                name: <$ty as MessageType>::NAME,
                decode: decode_as::<$ty>,
            }),+
        ];
    };
}

bodies! {
    RequestSession(core::RequestSession),
    OpenSession(core::OpenSession),
    CloseSession(core::CloseSession),
    Authorize(core::Authorize),
    AuthorizeResponse(core::AuthorizeResponse),
    Ping(core::Ping),
    Pong(core::Pong),
    ProtocolException(core::ProtocolException),
    Acknowledge(core::Acknowledge),
    GetResources(discovery::GetResources),
    GetResourcesResponse(discovery::GetResourcesResponse),
    GetDeletedResources(discovery::GetDeletedResources),
    GetDeletedResourcesResponse(discovery::GetDeletedResourcesResponse),
    GetResourcesEdgesResponse(discovery::GetResourcesEdgesResponse),
    GetDataObjects(store::GetDataObjects),
    PutDataObjects(store::PutDataObjects),
    DeleteDataObjects(store::DeleteDataObjects),
    GetDataObjectsResponse(store::GetDataObjectsResponse),
    StoreChunk(store::Chunk),
    PutDataObjectsResponse(store::PutDataObjectsResponse),
    DeleteDataObjectsResponse(store::DeleteDataObjectsResponse),
    FindDataObjects(store_query::FindDataObjects),
    FindDataObjectsResponse(store_query::FindDataObjectsResponse),
    StoreQueryChunk(store_query::Chunk),
    GetDataspaces(dataspace::GetDataspaces),
    GetDataspacesResponse(dataspace::GetDataspacesResponse),
    PutDataspaces(dataspace::PutDataspaces),
    DeleteDataspaces(dataspace::DeleteDataspaces),
    DeleteDataspacesResponse(dataspace::DeleteDataspacesResponse),
    PutDataspacesResponse(dataspace::PutDataspacesResponse),
    GetSupportedTypes(supported_types::GetSupportedTypes),
    GetSupportedTypesResponse(supported_types::GetSupportedTypesResponse),
    GetFrameMetadata(channel_data_frame::GetFrameMetadata),
    GetFrameMetadataResponse(channel_data_frame::GetFrameMetadataResponse),
    GetFrame(channel_data_frame::GetFrame),
    GetFrameResponseHeader(channel_data_frame::GetFrameResponseHeader),
    CancelGetFrame(channel_data_frame::CancelGetFrame),
    GetFrameResponseRows(channel_data_frame::GetFrameResponseRows),
    ObjectChanged(store_notification::ObjectChanged),
    ObjectDeleted(store_notification::ObjectDeleted),
    UnsubscribeNotifications(store_notification::UnsubscribeNotifications),
    ObjectAccessRevoked(store_notification::ObjectAccessRevoked),
    SubscribeNotifications(store_notification::SubscribeNotifications),
    SubscriptionEnded(store_notification::SubscriptionEnded),
    UnsolicitedStoreNotifications(store_notification::UnsolicitedStoreNotifications),
    SubscribeNotificationsResponse(store_notification::SubscribeNotificationsResponse),
    ObjectActiveStatusChanged(store_notification::ObjectActiveStatusChanged),
    DeleteParts(growing_object::DeleteParts),
    GetParts(growing_object::GetParts),
    GetPartsByRange(growing_object::GetPartsByRange),
    PutParts(growing_object::PutParts),
    GetPartsResponse(growing_object::GetPartsResponse),
    ReplacePartsByRange(growing_object::ReplacePartsByRange),
    GetPartsMetadata(growing_object::GetPartsMetadata),
    GetPartsMetadataResponse(growing_object::GetPartsMetadataResponse),
    GetPartsByRangeResponse(growing_object::GetPartsByRangeResponse),
    DeletePartsResponse(growing_object::DeletePartsResponse),
    ReplacePartsByRangeResponse(growing_object::ReplacePartsByRangeResponse),
    PutPartsResponse(growing_object::PutPartsResponse),
    GetGrowingDataObjectsHeader(growing_object::GetGrowingDataObjectsHeader),
    GetGrowingDataObjectsHeaderResponse(growing_object::GetGrowingDataObjectsHeaderResponse),
    PutGrowingDataObjectsHeader(growing_object::PutGrowingDataObjectsHeader),
    PutGrowingDataObjectsHeaderResponse(growing_object::PutGrowingDataObjectsHeaderResponse),
    GrowingObjectGetChangeAnnotations(growing_object::GetChangeAnnotations),
    GrowingObjectGetChangeAnnotationsResponse(growing_object::GetChangeAnnotationsResponse),
    PartsChanged(growing_object_notification::PartsChanged),
    PartsDeleted(growing_object_notification::PartsDeleted),
    UnsubscribePartNotification(growing_object_notification::UnsubscribePartNotification),
    PartsReplacedByRange(growing_object_notification::PartsReplacedByRange),
    SubscribePartNotifications(growing_object_notification::SubscribePartNotifications),
    PartSubscriptionEnded(growing_object_notification::PartSubscriptionEnded),
    UnsolicitedPartNotifications(growing_object_notification::UnsolicitedPartNotifications),
    SubscribePartNotificationsResponse(growing_object_notification::SubscribePartNotificationsResponse),
    StartTransaction(transaction::StartTransaction),
    StartTransactionResponse(transaction::StartTransactionResponse),
    CommitTransaction(transaction::CommitTransaction),
    RollbackTransaction(transaction::RollbackTransaction),
    CommitTransactionResponse(transaction::CommitTransactionResponse),
    RollbackTransactionResponse(transaction::RollbackTransactionResponse),
    GetChannelMetadata(channel_subscribe::GetChannelMetadata),
    GetChannelMetadataResponse(channel_subscribe::GetChannelMetadataResponse),
    SubscribeChannels(channel_subscribe::SubscribeChannels),
    ChannelSubscribeChannelData(channel_subscribe::ChannelData),
    RangeReplaced(channel_subscribe::RangeReplaced),
    UnsubscribeChannels(channel_subscribe::UnsubscribeChannels),
    SubscriptionsStopped(channel_subscribe::SubscriptionsStopped),
    GetRanges(channel_subscribe::GetRanges),
    GetRangesResponse(channel_subscribe::GetRangesResponse),
    CancelGetRanges(channel_subscribe::CancelGetRanges),
    SubscribeChannelsResponse(channel_subscribe::SubscribeChannelsResponse),
    ChannelsTruncated(channel_subscribe::ChannelsTruncated),
    ChannelSubscribeGetChangeAnnotations(channel_subscribe::GetChangeAnnotations),
    ChannelSubscribeGetChangeAnnotationsResponse(channel_subscribe::GetChangeAnnotationsResponse),
    OpenChannels(channel_data_load::OpenChannels),
    OpenChannelsResponse(channel_data_load::OpenChannelsResponse),
    CloseChannels(channel_data_load::CloseChannels),
    ChannelDataLoadChannelData(channel_data_load::ChannelData),
    ReplaceRange(channel_data_load::ReplaceRange),
    ChannelsClosed(channel_data_load::ChannelsClosed),
    ReplaceRangeResponse(channel_data_load::ReplaceRangeResponse),
    TruncateChannels(channel_data_load::TruncateChannels),
    TruncateChannelsResponse(channel_data_load::TruncateChannelsResponse),
}

impl Body {
    /// Bodies shaped as a keyed or listed collection: the type name ends in
    /// `s` or `sResponse`.
    #[must_use]
    pub fn is_plural(&self) -> bool {
        let name = self.type_name();
        name.ends_with('s') || name.ends_with("sResponse")
    }

    #[must_use]
    pub fn is_chunk(&self) -> bool { self.type_name() == "Chunk" }

    /// Whether the body carries a `data_objects` collection.
    #[must_use]
    pub fn is_chunkable(&self) -> bool { self.data_objects().is_some() }

    /// Blob id and payload of a chunk body.
    #[must_use]
    pub fn chunk_parts(&self) -> Option<(Uuid, &[u8])> {
        match self {
            Self::StoreChunk(chunk) => Some((chunk.blob_id, &chunk.data)),
            Self::StoreQueryChunk(chunk) => Some((chunk.blob_id, &chunk.data)),
            _ => None,
        }
    }

    /// Build the chunk body of `protocol`, if that protocol defines one.
    #[must_use]
    pub fn new_chunk(protocol: i32, blob_id: Uuid, data: Vec<u8>, final_chunk: bool) -> Option<Self> {
        match protocol {
            store::Chunk::PROTOCOL => Some(Self::StoreChunk(store::Chunk {
                blob_id,
                data,
                final_chunk,
            })),
            store_query::Chunk::PROTOCOL => Some(Self::StoreQueryChunk(store_query::Chunk {
                blob_id,
                data,
                final_chunk,
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
