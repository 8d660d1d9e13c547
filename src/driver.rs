//! Transport-agnostic pump for one session.
//!
//! [`SessionDriver`] reads frames from any `Stream` of byte buffers, runs
//! them through an [`EtpConnection`] one at a time and writes every reply
//! frame, in order, to any `Sink`. It plays the external scheduler for the
//! multipart timeout and sweeps stale assemblies before each frame.

use std::io;

use bytes::Bytes;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, warn};

use crate::{connection::EtpConnection, error::ConnectionError};

/// Drives an [`EtpConnection`] from a frame stream to a frame sink.
#[derive(Debug)]
pub struct SessionDriver {
    connection: EtpConnection,
    shutdown: CancellationToken,
}

impl SessionDriver {
    #[must_use]
    pub fn new(connection: EtpConnection, shutdown: CancellationToken) -> Self { Self { connection, shutdown } }

    #[must_use]
    pub const fn connection(&self) -> &EtpConnection { &self.connection }

    #[must_use]
    pub fn into_connection(self) -> EtpConnection { self.connection }

    /// Pump frames until the input ends or shutdown is requested.
    ///
    /// A frame that has started processing is always finished and its
    /// replies written, even if shutdown is requested meanwhile.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Io`] if reading or writing fails, and any
    /// error [`EtpConnection::handle_bytes`] reports.
    pub async fn run<S, K>(&mut self, mut input: S, mut output: K) -> Result<(), ConnectionError>
    where
        S: Stream<Item = io::Result<Bytes>> + Unpin,
        K: Sink<Bytes, Error = io::Error> + Unpin,
    {
        let span = info_span!(
            "etp_session",
            client = %self.connection.client_info(),
            role = self.connection.role().as_str()
        );
        async move {
            let mut frames_in = 0_usize;
            loop {
                let frame = tokio::select! {
                    biased;

                    () = self.shutdown.cancelled() => {
                        debug!(frames_in, "session shutdown requested");
                        break;
                    }

                    frame = input.next() => frame,
                };
                let Some(frame) = frame else {
                    debug!(frames_in, "input closed");
                    break;
                };
                let frame = frame.inspect_err(|e| warn!(error = %e, "transport read failed"))?;
                frames_in += 1;

                let expired = self.connection.purge_expired_multipart(Instant::now());
                if expired > 0 {
                    debug!(expired, "multipart assemblies expired");
                }
                let replies = self.connection.handle_bytes(&frame).await?;
                debug!(len = frame.len(), replies = replies.len(), "frame processed");
                for reply in replies {
                    output.send(reply).await?;
                }
            }
            output.flush().await?;
            Ok(())
        }
        .instrument(span)
        .await
    }
}
