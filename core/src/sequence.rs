//! Monotonic request tickets used to discard stale responses.
//!
//! Every transition takes a ticket before it fetches. A response is only
//! applied while its ticket is still the latest one issued for its slot.

use std::collections::HashMap;

use crate::level::NodeKey;

/// What a request is racing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSlot {
    /// The single drill-down path (load, select, back, reset).
    Navigation,
    /// The children of one node in selective mode.
    Node(NodeKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub slot: RequestSlot,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: u64,
    latest: HashMap<RequestSlot, u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every earlier ticket of `slot`.
    pub fn issue(&mut self, slot: RequestSlot) -> Ticket {
        self.next += 1;
        self.latest.insert(slot, self.next);
        Ticket {
            slot,
            seq: self.next,
        }
    }

    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.seq)
    }

    /// Forgets the slot once its latest request has settled.
    pub fn settle(&mut self, ticket: &Ticket) {
        if self.is_latest(ticket) {
            self.latest.remove(&ticket.slot);
        }
    }

    /// Supersedes the outstanding tickets for the children of `keys`.
    pub fn forget<'a>(&mut self, keys: impl IntoIterator<Item = &'a NodeKey>) {
        for key in keys {
            self.latest.remove(&RequestSlot::Node(*key));
        }
    }

    /// Supersedes every outstanding ticket.
    pub fn invalidate_all(&mut self) {
        self.latest.clear();
    }

    /// Number of slots with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.latest.len()
    }
}
