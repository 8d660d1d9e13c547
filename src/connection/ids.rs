//! Outbound message id allocation.

use std::sync::atomic::{AtomicI64, Ordering};

use super::ConnectionRole;

/// Ids advance by two so that client and server allocations never collide.
pub const MESSAGE_ID_STEP: i64 = 2;

/// Hands out the message ids of one session.
///
/// Servers allocate odd ids starting at 1, clients even ids starting at 2.
#[derive(Debug)]
pub struct MessageIdCounter {
    next: AtomicI64,
}

impl MessageIdCounter {
    /// Create a counter seeded for `role`.
    #[must_use]
    pub const fn for_role(role: ConnectionRole) -> Self {
        Self::starting_at(match role {
            ConnectionRole::Server => 1,
            ConnectionRole::Client => 2,
        })
    }

    #[must_use]
    pub const fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Consume and return the next id.
    ///
    /// # Panics
    ///
    /// Panics if the counter would overflow `i64`. A session never comes
    /// close to that many messages.
    #[must_use]
    pub fn next_id(&self) -> i64 {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(MESSAGE_ID_STEP)
            })
            .unwrap_or_else(|_| panic!("message id counter exhausted"))
    }

    /// The id the next call to [`next_id`](Self::next_id) returns.
    #[must_use]
    pub fn peek(&self) -> i64 { self.next.load(Ordering::Relaxed) }
}
