//! Canonical error types for the crate.
//!
//! [`EtpError`] is the wire-visible taxonomy: every variant maps to a stable
//! ETP error code and renders itself as a `ProtocolException` reply.
//! [`ConnectionError`] covers failures that are not protocol replies and are
//! surfaced to the caller of the session state machine instead.

use std::io;

use thiserror::Error;

use crate::{
    message::Message,
    schema::{core::ProtocolException, datatypes::ErrorInfo},
};

/// Protocol-level fault that is reported to the peer as a `ProtocolException`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EtpError {
    #[error("The endpoint does not support the requested role.")]
    NoRole,
    #[error("The server does not support any of the requested protocols.")]
    NoSupportedProtocols,
    #[error(
        "The message type ID is either not defined at all in the ETP Specification or not a \
         correct message type ID for the receiving role."
    )]
    InvalidMessageType,
    #[error("The endpoint does not support the protocol (#{0}) identified in a message header.")]
    UnsupportedProtocol(i32),
    #[error("Logically invalid argument.")]
    InvalidArgument,
    #[error("Server has denied the request. {0}")]
    RequestDenied(String),
    #[error("The operation is not supported by the endpoint.")]
    NotSupported,
    #[error("The message is not allowed in the current state of the protocol.")]
    InvalidState,
    #[error("The URI sent is either a malformed URI or is not a valid URI format for ETP.")]
    InvalidUri,
    #[error("The security token is expired.")]
    ExpiredToken,
    #[error("Resource not found.")]
    NotFound,
    #[error("Request exceeds allowed limits.")]
    LimitExceeded,
    #[error("Message can not be compressed.")]
    CompressionNotSupported,
    #[error("Invalid XML document.")]
    InvalidObject,
    #[error("Maximum number of transactions per ETP session has been exceeded.")]
    MaxTransactionsExceeded,
    #[error("The content type is not supported by the server.")]
    ContentTypeNotSupported,
    #[error(
        "Operation exceeds the stores maximum advertised MaxDataObjectSize, MaxPartSize, or \
         MaxDataArraySize."
    )]
    MaxSizeExceeded,
    #[error("Canceled transmission of multi-message response.")]
    MultipartCancelled,
    #[error("Unable to deserialize the header or body of a message.")]
    InvalidMessage,
    #[error("IndexKind used in message is invalid for the dataset.")]
    InvalidIndexKind,
    #[error("No agreement can be reached on the format (XML or JSON) of data objects.")]
    NoSupportedFormats,
    #[error("Rejects a customer-assigned request UUID (requestUuid).")]
    RequestUuidRejected,
    #[error("Tried to update an existing growing object using Store (Protocol 4).")]
    UpdateGrowingObjectDenied,
    #[error("Receiver's outgoing buffers capacity exceeded.")]
    BackPressureLimitExceeded,
    #[error("Back Pressure Warning.")]
    BackPressureWarning,
    #[error("Response timeout")]
    TimedOut,
    #[error("Authorization required.")]
    AuthorizationRequired,
    #[error("Authorization expiring.")]
    AuthorizationExpiring,
    #[error("The server does not support any of the client's supported data object types.")]
    NoSupportedDataObjectTypes,
    #[error("Response count exceeded.")]
    ResponseCountExceeded,
    #[error("Sent in response to a ChannelData message that is not appending data to a channel.")]
    InvalidAppend,
    #[error("Invalid operation.")]
    InvalidOperation,
    #[error("Operations are requested on a channel that does not exist.")]
    InvalidChannelId,
    #[error("The data object type is not supported by the store.")]
    UnsupportedObject,
    #[error("Store does not support cascading deletes.")]
    NoCascadeDelete,
    #[error("ETP only supports a single data object, one XML document.")]
    PluralObject,
    #[error("Customer supplies the growing portion in a Put.")]
    GrowingPortionIgnored,
    #[error("Ask for changes beyond the stated change period of a server.")]
    RetentionPeriodExceeded,
    #[error("Growing object operation on an object that is not defined as a growing object type.")]
    NotGrowingObject,
    #[error("{0}")]
    Internal(String),
}

impl EtpError {
    /// Stable numeric code carried in `ProtocolException.error.code`.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::NoRole => 1,
            Self::NoSupportedProtocols => 2,
            Self::InvalidMessageType => 3,
            Self::UnsupportedProtocol(_) => 4,
            Self::InvalidArgument => 5,
            Self::RequestDenied(_) => 6,
            Self::NotSupported => 7,
            Self::InvalidState => 8,
            Self::InvalidUri => 9,
            Self::ExpiredToken => 10,
            Self::NotFound => 11,
            Self::LimitExceeded => 12,
            Self::CompressionNotSupported => 13,
            Self::InvalidObject => 14,
            Self::MaxTransactionsExceeded => 15,
            Self::ContentTypeNotSupported => 16,
            Self::MaxSizeExceeded => 17,
            Self::MultipartCancelled => 18,
            Self::InvalidMessage => 19,
            Self::InvalidIndexKind => 20,
            Self::NoSupportedFormats => 21,
            Self::RequestUuidRejected => 22,
            Self::UpdateGrowingObjectDenied => 23,
            Self::BackPressureLimitExceeded => 24,
            Self::BackPressureWarning => 25,
            Self::TimedOut => 26,
            Self::AuthorizationRequired => 27,
            Self::AuthorizationExpiring => 28,
            Self::NoSupportedDataObjectTypes => 29,
            Self::ResponseCountExceeded => 30,
            Self::InvalidAppend => 31,
            Self::InvalidOperation => 32,
            Self::InvalidChannelId => 1002,
            Self::UnsupportedObject => 4001,
            Self::NoCascadeDelete => 4003,
            Self::PluralObject => 4004,
            Self::GrowingPortionIgnored => 4005,
            Self::RetentionPeriodExceeded => 5001,
            Self::NotGrowingObject => 6001,
            Self::Internal(_) => -1,
        }
    }

    /// Render the error as the `ErrorInfo` record sent on the wire.
    #[must_use]
    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            message: self.to_string(),
            code: self.code(),
        }
    }

    /// Build a `ProtocolException` reply carrying this error.
    ///
    /// The reply is not marked final; callers that emit it as a complete
    /// response set the FIN bit themselves.
    #[must_use]
    pub fn to_message(&self, message_id: i64, correlation_id: i64) -> Message {
        let body = ProtocolException {
            error: Some(self.to_error_info()),
            errors: Default::default(),
        };
        Message::from_body(body)
            .with_message_id(message_id)
            .with_correlation_id(correlation_id)
    }
}

/// Failures of the session machinery itself, never sent to the peer.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// A completed multipart exchange carried no referencer message.
    #[error("multipart exchange {correlation_id} completed without a chunk referencer")]
    MissingReferencer { correlation_id: i64 },
    /// The transport feeding the session driver failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::EtpError;
    use crate::schema::Body;

    #[rstest]
    #[case(EtpError::NoRole, 1)]
    #[case(EtpError::UnsupportedProtocol(42), 4)]
    #[case(EtpError::InvalidState, 8)]
    #[case(EtpError::MaxSizeExceeded, 17)]
    #[case(EtpError::InvalidMessage, 19)]
    #[case(EtpError::AuthorizationRequired, 27)]
    #[case(EtpError::InvalidOperation, 32)]
    #[case(EtpError::InvalidChannelId, 1002)]
    #[case(EtpError::PluralObject, 4004)]
    #[case(EtpError::RetentionPeriodExceeded, 5001)]
    #[case(EtpError::NotGrowingObject, 6001)]
    #[case(EtpError::Internal("boom".to_owned()), -1)]
    fn error_codes_are_stable(#[case] error: EtpError, #[case] code: i32) {
        assert_eq!(error.code(), code);
    }

    #[test]
    fn unsupported_protocol_names_the_protocol() {
        let message = EtpError::UnsupportedProtocol(2000).to_string();
        assert!(message.contains("#2000"), "unexpected message: {message}");
    }

    #[test]
    fn to_message_builds_correlated_protocol_exception() {
        let reply = EtpError::NotFound.to_message(9, 4);

        assert_eq!(reply.header().message_id, 9);
        assert_eq!(reply.header().correlation_id, 4);
        assert_eq!(reply.header().protocol, 0);
        assert_eq!(reply.header().message_type, 1000);
        assert!(!reply.is_final());
        let Body::ProtocolException(body) = reply.body() else {
            panic!("expected ProtocolException, got {:?}", reply.body());
        };
        let info = body.error.as_ref().expect("error info present");
        assert_eq!(info.code, 11);
        assert_eq!(info.message, "Resource not found.");
    }
}
