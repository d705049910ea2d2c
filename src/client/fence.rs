//! Request-id fencing for overlapping fetches.
//!
//! Every fetch takes a ticket before it goes out. When the response comes
//! back it may only be applied if no response with a newer ticket has been
//! applied already, so a slow poll can't overwrite a fresher list.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestFence {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next ticket. Tickets start at 1 and strictly increase.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record `ticket` as applied if it is newer than everything applied so
    /// far. Returns false for stale tickets.
    pub fn try_apply(&self, ticket: u64) -> bool {
        self.applied.fetch_max(ticket, Ordering::SeqCst) < ticket
    }

    pub fn last_applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }
}
