//! Observable lifecycle of a session.

use derive_more::Display;

/// Where a session stands in its lifecycle.
///
/// Derived from the connection flags on demand; transitions happen only
/// while an inbound message is processed.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Authorization is required and the peer has not authorized yet.
    #[display("unauthenticated")]
    Unauthenticated,
    /// The peer may talk Core but no session is open.
    #[display("authenticated, not connected")]
    AuthenticatedNotConnected,
    /// A session is open; every registered protocol is reachable.
    #[display("connected")]
    Connected,
    /// The peer closed the session with `CloseSession`.
    #[display("closed")]
    Closed,
}

impl SessionState {
    /// Whether non-Core protocols may be used.
    #[must_use]
    pub const fn is_open(self) -> bool { matches!(self, Self::Connected) }
}
