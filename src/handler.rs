//! Pluggable protocol handlers.
//!
//! A session routes every decoded message to the [`ProtocolHandler`]
//! registered for its protocol id. Applications rarely implement
//! [`ProtocolHandler`] directly: each protocol has a trait with one
//! `on_<message>` method per body type (every method defaulting to
//! [`EtpError::NotSupported`]) and an adapter turning it into a
//! [`ProtocolHandler`].
//!
//! ```
//! use async_trait::async_trait;
//! use etpproto::{
//!     client_info::ClientInfo,
//!     error::EtpError,
//!     handler::{CoreHandler, CoreProtocol, HandlerRegistry},
//!     message::MessageHeader,
//!     protocol::CommunicationProtocol,
//!     response::Response,
//!     schema::core::{Ping, Pong},
//! };
//!
//! struct Heartbeat;
//!
//! #[async_trait]
//! impl CoreHandler for Heartbeat {
//!     async fn on_ping(
//!         &self,
//!         ping: Ping,
//!         _header: &MessageHeader,
//!         _client_info: &mut ClientInfo,
//!     ) -> Result<Response, EtpError> {
//!         Ok(Response::reply(Pong {
//!             current_date_time: ping.current_date_time,
//!         }))
//!     }
//! }
//!
//! let registry = HandlerRegistry::builder()
//!     .register(CommunicationProtocol::Core, CoreProtocol(Heartbeat))
//!     .expect("core registered once")
//!     .build();
//! assert!(registry.get(0).is_some());
//! ```

use async_trait::async_trait;

use crate::{
    client_info::ClientInfo,
    error::EtpError,
    message::MessageHeader,
    response::Response,
    schema::Body,
};

pub mod registry;

pub use registry::{HandlerRegistry, HandlerRegistryBuilder, RegistryError};

/// Object-safe entry point the session dispatches to.
#[async_trait]
pub trait ProtocolHandler: Send + Sync {
    /// Produce the replies to one inbound message.
    ///
    /// `client_info` describes the peer and may be updated, for instance to
    /// mark it authenticated.
    ///
    /// # Errors
    ///
    /// Any [`EtpError`] is sent back to the peer as a `ProtocolException`
    /// correlated to the request.
    async fn handle(
        &self,
        body: Body,
        header: &MessageHeader,
        client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError>;
}

macro_rules! protocol_handler {
    (
        $(#[$meta:meta])*
        $protocol:ident: $handler:ident => $adapter:ident {
            $($variant:ident($ty:path) => $method:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[async_trait]
        pub trait $handler: Send + Sync {
            $(
                #[doc = concat!("Handle `", stringify!($variant), "`.")]
                ///
                /// # Errors
                ///
                /// Defaults to [`EtpError::NotSupported`].
                async fn $method(
                    &self,
                    _message: $ty,
                    _header: &MessageHeader,
                    _client_info: &mut ClientInfo,
                ) -> Result<Response, EtpError> {
                    Err(EtpError::NotSupported)
                }
            )+
        }

        #[doc = concat!("Adapts a [`", stringify!($handler), "`] into a [`ProtocolHandler`].")]
        #[derive(Clone, Debug, Default)]
        pub struct $adapter<H>(pub H);

        impl<H> $adapter<H> {
            /// Protocol this adapter serves.
            pub const PROTOCOL: $crate::protocol::CommunicationProtocol =
                $crate::protocol::CommunicationProtocol::$protocol;
        }

        #[async_trait]
        impl<H: $handler> ProtocolHandler for $adapter<H> {
            async fn handle(
                &self,
                body: Body,
                header: &MessageHeader,
                client_info: &mut ClientInfo,
            ) -> Result<Response, EtpError> {
                match body {
                    $(Body::$variant(message) => self.0.$method(message, header, client_info).await,)+
                    _ => Err(EtpError::InvalidMessageType),
                }
            }
        }
    };
}

protocol_handler! {
    /// Core (protocol 0): session lifecycle, authorization and errors.
    Core: CoreHandler => CoreProtocol {
        RequestSession(crate::schema::core::RequestSession) => on_request_session,
        OpenSession(crate::schema::core::OpenSession) => on_open_session,
        CloseSession(crate::schema::core::CloseSession) => on_close_session,
        Authorize(crate::schema::core::Authorize) => on_authorize,
        AuthorizeResponse(crate::schema::core::AuthorizeResponse) => on_authorize_response,
        Ping(crate::schema::core::Ping) => on_ping,
        Pong(crate::schema::core::Pong) => on_pong,
        ProtocolException(crate::schema::core::ProtocolException) => on_protocol_exception,
        Acknowledge(crate::schema::core::Acknowledge) => on_acknowledge,
    }
}

protocol_handler! {
    /// Discovery (protocol 3).
    Discovery: DiscoveryHandler => DiscoveryProtocol {
        GetResources(crate::schema::discovery::GetResources) => on_get_resources,
        GetResourcesResponse(crate::schema::discovery::GetResourcesResponse) => on_get_resources_response,
        GetDeletedResources(crate::schema::discovery::GetDeletedResources) => on_get_deleted_resources,
        GetDeletedResourcesResponse(crate::schema::discovery::GetDeletedResourcesResponse) => on_get_deleted_resources_response,
        GetResourcesEdgesResponse(crate::schema::discovery::GetResourcesEdgesResponse) => on_get_resources_edges_response,
    }
}

protocol_handler! {
    /// Store (protocol 4).
    Store: StoreHandler => StoreProtocol {
        GetDataObjects(crate::schema::store::GetDataObjects) => on_get_data_objects,
        PutDataObjects(crate::schema::store::PutDataObjects) => on_put_data_objects,
        DeleteDataObjects(crate::schema::store::DeleteDataObjects) => on_delete_data_objects,
        GetDataObjectsResponse(crate::schema::store::GetDataObjectsResponse) => on_get_data_objects_response,
        StoreChunk(crate::schema::store::Chunk) => on_chunk,
        PutDataObjectsResponse(crate::schema::store::PutDataObjectsResponse) => on_put_data_objects_response,
        DeleteDataObjectsResponse(crate::schema::store::DeleteDataObjectsResponse) => on_delete_data_objects_response,
    }
}

protocol_handler! {
    /// StoreQuery (protocol 14).
    StoreQuery: StoreQueryHandler => StoreQueryProtocol {
        FindDataObjects(crate::schema::store_query::FindDataObjects) => on_find_data_objects,
        FindDataObjectsResponse(crate::schema::store_query::FindDataObjectsResponse) => on_find_data_objects_response,
        StoreQueryChunk(crate::schema::store_query::Chunk) => on_chunk,
    }
}

protocol_handler! {
    /// Dataspace (protocol 24).
    Dataspace: DataspaceHandler => DataspaceProtocol {
        GetDataspaces(crate::schema::dataspace::GetDataspaces) => on_get_dataspaces,
        GetDataspacesResponse(crate::schema::dataspace::GetDataspacesResponse) => on_get_dataspaces_response,
        PutDataspaces(crate::schema::dataspace::PutDataspaces) => on_put_dataspaces,
        DeleteDataspaces(crate::schema::dataspace::DeleteDataspaces) => on_delete_dataspaces,
        DeleteDataspacesResponse(crate::schema::dataspace::DeleteDataspacesResponse) => on_delete_dataspaces_response,
        PutDataspacesResponse(crate::schema::dataspace::PutDataspacesResponse) => on_put_dataspaces_response,
    }
}

protocol_handler! {
    /// SupportedTypes (protocol 25).
    SupportedTypes: SupportedTypesHandler => SupportedTypesProtocol {
        GetSupportedTypes(crate::schema::supported_types::GetSupportedTypes) => on_get_supported_types,
        GetSupportedTypesResponse(crate::schema::supported_types::GetSupportedTypesResponse) => on_get_supported_types_response,
    }
}

protocol_handler! {
    /// ChannelDataFrame (protocol 2).
    ChannelDataFrame: ChannelDataFrameHandler => ChannelDataFrameProtocol {
        CancelGetFrame(crate::schema::channel_data_frame::CancelGetFrame) => on_cancel_get_frame,
        GetFrame(crate::schema::channel_data_frame::GetFrame) => on_get_frame,
        GetFrameMetadata(crate::schema::channel_data_frame::GetFrameMetadata) => on_get_frame_metadata,
        GetFrameMetadataResponse(crate::schema::channel_data_frame::GetFrameMetadataResponse) => on_get_frame_metadata_response,
        GetFrameResponseHeader(crate::schema::channel_data_frame::GetFrameResponseHeader) => on_get_frame_response_header,
        GetFrameResponseRows(crate::schema::channel_data_frame::GetFrameResponseRows) => on_get_frame_response_rows,
    }
}

protocol_handler! {
    /// StoreNotification (protocol 5).
    StoreNotification: StoreNotificationHandler => StoreNotificationProtocol {
        ObjectAccessRevoked(crate::schema::store_notification::ObjectAccessRevoked) => on_object_access_revoked,
        ObjectActiveStatusChanged(crate::schema::store_notification::ObjectActiveStatusChanged) => on_object_active_status_changed,
        ObjectChanged(crate::schema::store_notification::ObjectChanged) => on_object_changed,
        ObjectDeleted(crate::schema::store_notification::ObjectDeleted) => on_object_deleted,
        SubscribeNotifications(crate::schema::store_notification::SubscribeNotifications) => on_subscribe_notifications,
        SubscribeNotificationsResponse(crate::schema::store_notification::SubscribeNotificationsResponse) => on_subscribe_notifications_response,
        SubscriptionEnded(crate::schema::store_notification::SubscriptionEnded) => on_subscription_ended,
        UnsolicitedStoreNotifications(crate::schema::store_notification::UnsolicitedStoreNotifications) => on_unsolicited_store_notifications,
        UnsubscribeNotifications(crate::schema::store_notification::UnsubscribeNotifications) => on_unsubscribe_notifications,
    }
}

protocol_handler! {
    /// GrowingObject (protocol 6).
    GrowingObject: GrowingObjectHandler => GrowingObjectProtocol {
        DeleteParts(crate::schema::growing_object::DeleteParts) => on_delete_parts,
        DeletePartsResponse(crate::schema::growing_object::DeletePartsResponse) => on_delete_parts_response,
        GrowingObjectGetChangeAnnotations(crate::schema::growing_object::GetChangeAnnotations) => on_get_change_annotations,
        GrowingObjectGetChangeAnnotationsResponse(crate::schema::growing_object::GetChangeAnnotationsResponse) => on_get_change_annotations_response,
        GetGrowingDataObjectsHeader(crate::schema::growing_object::GetGrowingDataObjectsHeader) => on_get_growing_data_objects_header,
        GetGrowingDataObjectsHeaderResponse(crate::schema::growing_object::GetGrowingDataObjectsHeaderResponse) => on_get_growing_data_objects_header_response,
        GetParts(crate::schema::growing_object::GetParts) => on_get_parts,
        GetPartsByRange(crate::schema::growing_object::GetPartsByRange) => on_get_parts_by_range,
        GetPartsByRangeResponse(crate::schema::growing_object::GetPartsByRangeResponse) => on_get_parts_by_range_response,
        GetPartsMetadata(crate::schema::growing_object::GetPartsMetadata) => on_get_parts_metadata,
        GetPartsMetadataResponse(crate::schema::growing_object::GetPartsMetadataResponse) => on_get_parts_metadata_response,
        GetPartsResponse(crate::schema::growing_object::GetPartsResponse) => on_get_parts_response,
        PutGrowingDataObjectsHeader(crate::schema::growing_object::PutGrowingDataObjectsHeader) => on_put_growing_data_objects_header,
        PutGrowingDataObjectsHeaderResponse(crate::schema::growing_object::PutGrowingDataObjectsHeaderResponse) => on_put_growing_data_objects_header_response,
        PutParts(crate::schema::growing_object::PutParts) => on_put_parts,
        PutPartsResponse(crate::schema::growing_object::PutPartsResponse) => on_put_parts_response,
        ReplacePartsByRange(crate::schema::growing_object::ReplacePartsByRange) => on_replace_parts_by_range,
        ReplacePartsByRangeResponse(crate::schema::growing_object::ReplacePartsByRangeResponse) => on_replace_parts_by_range_response,
    }
}

protocol_handler! {
    /// GrowingObjectNotification (protocol 7).
    GrowingObjectNotification: GrowingObjectNotificationHandler => GrowingObjectNotificationProtocol {
        PartSubscriptionEnded(crate::schema::growing_object_notification::PartSubscriptionEnded) => on_part_subscription_ended,
        PartsChanged(crate::schema::growing_object_notification::PartsChanged) => on_parts_changed,
        PartsDeleted(crate::schema::growing_object_notification::PartsDeleted) => on_parts_deleted,
        PartsReplacedByRange(crate::schema::growing_object_notification::PartsReplacedByRange) => on_parts_replaced_by_range,
        SubscribePartNotifications(crate::schema::growing_object_notification::SubscribePartNotifications) => on_subscribe_part_notifications,
        SubscribePartNotificationsResponse(crate::schema::growing_object_notification::SubscribePartNotificationsResponse) => on_subscribe_part_notifications_response,
        UnsolicitedPartNotifications(crate::schema::growing_object_notification::UnsolicitedPartNotifications) => on_unsolicited_part_notifications,
        UnsubscribePartNotification(crate::schema::growing_object_notification::UnsubscribePartNotification) => on_unsubscribe_part_notification,
    }
}

protocol_handler! {
    /// Transaction (protocol 18).
    Transaction: TransactionHandler => TransactionProtocol {
        CommitTransaction(crate::schema::transaction::CommitTransaction) => on_commit_transaction,
        CommitTransactionResponse(crate::schema::transaction::CommitTransactionResponse) => on_commit_transaction_response,
        RollbackTransaction(crate::schema::transaction::RollbackTransaction) => on_rollback_transaction,
        RollbackTransactionResponse(crate::schema::transaction::RollbackTransactionResponse) => on_rollback_transaction_response,
        StartTransaction(crate::schema::transaction::StartTransaction) => on_start_transaction,
        StartTransactionResponse(crate::schema::transaction::StartTransactionResponse) => on_start_transaction_response,
    }
}

protocol_handler! {
    /// ChannelSubscribe (protocol 21).
    ChannelSubscribe: ChannelSubscribeHandler => ChannelSubscribeProtocol {
        CancelGetRanges(crate::schema::channel_subscribe::CancelGetRanges) => on_cancel_get_ranges,
        ChannelSubscribeChannelData(crate::schema::channel_subscribe::ChannelData) => on_channel_data,
        ChannelsTruncated(crate::schema::channel_subscribe::ChannelsTruncated) => on_channels_truncated,
        ChannelSubscribeGetChangeAnnotations(crate::schema::channel_subscribe::GetChangeAnnotations) => on_get_change_annotations,
        ChannelSubscribeGetChangeAnnotationsResponse(crate::schema::channel_subscribe::GetChangeAnnotationsResponse) => on_get_change_annotations_response,
        GetChannelMetadata(crate::schema::channel_subscribe::GetChannelMetadata) => on_get_channel_metadata,
        GetChannelMetadataResponse(crate::schema::channel_subscribe::GetChannelMetadataResponse) => on_get_channel_metadata_response,
        GetRanges(crate::schema::channel_subscribe::GetRanges) => on_get_ranges,
        GetRangesResponse(crate::schema::channel_subscribe::GetRangesResponse) => on_get_ranges_response,
        RangeReplaced(crate::schema::channel_subscribe::RangeReplaced) => on_range_replaced,
        SubscribeChannels(crate::schema::channel_subscribe::SubscribeChannels) => on_subscribe_channels,
        SubscribeChannelsResponse(crate::schema::channel_subscribe::SubscribeChannelsResponse) => on_subscribe_channels_response,
        SubscriptionsStopped(crate::schema::channel_subscribe::SubscriptionsStopped) => on_subscriptions_stopped,
        UnsubscribeChannels(crate::schema::channel_subscribe::UnsubscribeChannels) => on_unsubscribe_channels,
    }
}

protocol_handler! {
    /// ChannelDataLoad (protocol 22).
    ChannelDataLoad: ChannelDataLoadHandler => ChannelDataLoadProtocol {
        ChannelDataLoadChannelData(crate::schema::channel_data_load::ChannelData) => on_channel_data,
        ChannelsClosed(crate::schema::channel_data_load::ChannelsClosed) => on_channels_closed,
        CloseChannels(crate::schema::channel_data_load::CloseChannels) => on_close_channels,
        OpenChannels(crate::schema::channel_data_load::OpenChannels) => on_open_channels,
        OpenChannelsResponse(crate::schema::channel_data_load::OpenChannelsResponse) => on_open_channels_response,
        ReplaceRange(crate::schema::channel_data_load::ReplaceRange) => on_replace_range,
        ReplaceRangeResponse(crate::schema::channel_data_load::ReplaceRangeResponse) => on_replace_range_response,
        TruncateChannels(crate::schema::channel_data_load::TruncateChannels) => on_truncate_channels,
        TruncateChannelsResponse(crate::schema::channel_data_load::TruncateChannelsResponse) => on_truncate_channels_response,
    }
}

#[cfg(test)]
mod tests;
