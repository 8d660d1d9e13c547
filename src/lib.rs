#![doc(html_root_url = "https://docs.rs/etpproto/latest")]
//! Session layer of the Energistics Transfer Protocol (ETP) v1.2.
//!
//! The crate turns raw ETP frames into typed messages and back, enforces the
//! session lifecycle and authorization gating, negotiates endpoint
//! capabilities, and fragments or reassembles payloads that do not fit the
//! negotiated frame size. Business logic lives in pluggable protocol
//! handlers; transport plumbing is left to the caller.

pub mod capability;
pub mod client_info;
pub mod codec;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod handler;
pub mod message;
pub mod metrics;
pub mod prelude;
pub mod protocol;
pub mod response;
pub mod schema;

pub use capability::EndpointCapabilityKind;
pub use client_info::ClientInfo;
pub use codec::CodecError;
pub use config::ConnectionConfig;
pub use connection::{ConnectionRole, EtpConnection, MessageIdCounter, SessionState};
pub use driver::SessionDriver;
pub use error::{ConnectionError, EtpError};
pub use handler::{HandlerRegistry, ProtocolHandler};
pub use message::{Message, MessageFlags, MessageHeader};
pub use metrics::{Direction, ERROR_REPLIES, MESSAGES_PROCESSED, MULTIPART_EXPIRED, MULTIPART_REASSEMBLED};
pub use protocol::CommunicationProtocol;
pub use response::{ReplyStream, Response};
