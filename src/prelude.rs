//! Optional convenience imports for writing protocol handlers.
//!
//! This module is intentionally small and focused on high-frequency types.
//! Prefer importing specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust,no_run
//! use etpproto::prelude::*;
//!
//! fn registry() -> Result<HandlerRegistry, RegistryError> {
//!     Ok(HandlerRegistry::builder().build())
//! }
//! ```

pub use async_trait::async_trait;

pub use crate::{
    client_info::ClientInfo,
    config::ConnectionConfig,
    connection::{ConnectionRole, EtpConnection},
    error::EtpError,
    handler::{
        ChannelDataFrameHandler,
        ChannelDataFrameProtocol,
        ChannelDataLoadHandler,
        ChannelDataLoadProtocol,
        ChannelSubscribeHandler,
        ChannelSubscribeProtocol,
        CoreHandler,
        CoreProtocol,
        DataspaceHandler,
        DataspaceProtocol,
        DiscoveryHandler,
        DiscoveryProtocol,
        GrowingObjectHandler,
        GrowingObjectNotificationHandler,
        GrowingObjectNotificationProtocol,
        GrowingObjectProtocol,
        HandlerRegistry,
        ProtocolHandler,
        RegistryError,
        StoreHandler,
        StoreNotificationHandler,
        StoreNotificationProtocol,
        StoreProtocol,
        StoreQueryHandler,
        StoreQueryProtocol,
        SupportedTypesHandler,
        SupportedTypesProtocol,
        TransactionHandler,
        TransactionProtocol,
    },
    message::{Message, MessageHeader},
    protocol::CommunicationProtocol,
    response::Response,
    schema::Body,
};
