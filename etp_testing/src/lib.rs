//! Utilities for driving an [`EtpConnection`](etpproto::connection::EtpConnection)
//! during tests.
//!
//! The crate bundles example protocol handlers, session fixtures wired to
//! them, and helpers that feed frames through a session and decode what it
//! sends back.
//!
//! ```rust
//! use etp_testing::{error_code, request_session, server, registry};
//!
//! # async fn example() {
//! let mut connection = server(registry());
//! let replies = connection
//!     .handle_message(Some(request_session(2, &[])))
//!     .await
//!     .unwrap();
//! assert_eq!(error_code(&replies[0]), None);
//! # }
//! ```

pub mod handlers;
pub mod helpers;
pub mod logging;
pub mod recorder;

pub use handlers::{
    ExampleCore,
    ExampleDataspace,
    ExampleDiscovery,
    ExampleStore,
    PASSWORD,
    USERNAME,
    basic_auth,
    resource,
};
pub use helpers::{
    DEFAULT_RESOURCE_COUNT,
    ExampleHandlers,
    auth_server,
    client,
    decode_frames,
    drive_frames,
    error_code,
    open_session,
    registry,
    registry_with,
    request_session,
    server,
};
pub use logging::{LoggerHandle, logger};
pub use recorder::{Recorded, counter_total, recorded};
