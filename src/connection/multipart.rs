//! Inbound chunk assemblies awaiting their final part.

use std::{collections::HashMap, time::Duration};

use tokio::time::Instant;

use crate::message::Message;

#[derive(Debug)]
struct Assembly {
    started_at: Instant,
    parts: Vec<Message>,
}

/// Parts of in-flight chunked exchanges, keyed by exchange id.
#[derive(Debug, Default)]
pub(crate) struct MultipartCache {
    assemblies: HashMap<i64, Assembly>,
}

impl MultipartCache {
    /// Append `part` to the assembly of `exchange_id`, opening it if needed.
    pub(crate) fn push(&mut self, exchange_id: i64, part: Message, now: Instant) {
        self.assemblies
            .entry(exchange_id)
            .or_insert_with(|| Assembly {
                started_at: now,
                parts: Vec::new(),
            })
            .parts
            .push(part);
    }

    /// Remove and return the parts of `exchange_id` in arrival order.
    pub(crate) fn take(&mut self, exchange_id: i64) -> Vec<Message> {
        self.assemblies
            .remove(&exchange_id)
            .map(|assembly| assembly.parts)
            .unwrap_or_default()
    }

    /// Drop assemblies opened more than `max_age` before `now`, returning
    /// their exchange ids.
    pub(crate) fn purge_older_than(&mut self, now: Instant, max_age: Duration) -> Vec<i64> {
        let mut expired = Vec::new();
        self.assemblies.retain(|exchange_id, assembly| {
            let keep = now.saturating_duration_since(assembly.started_at) <= max_age;
            if !keep {
                expired.push(*exchange_id);
            }
            keep
        });
        expired.sort_unstable();
        expired
    }

    pub(crate) fn contains(&self, exchange_id: i64) -> bool { self.assemblies.contains_key(&exchange_id) }

    pub(crate) fn len(&self) -> usize { self.assemblies.len() }
}
