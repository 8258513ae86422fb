//! Request sequencing.
//!
//! Ids increase monotonically across all kinds. Only the latest id issued
//! for a kind is accepted; anything older was superseded while in flight.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{RequestKind, Response};

#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    latest: HashMap<RequestKind, u64>,
    in_flight: HashMap<RequestKind, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the id for a new request of `kind`, superseding any
    /// request of that kind still in flight.
    pub fn issue(&mut self, kind: RequestKind) -> u64 {
        self.next += 1;
        let seq = self.next;
        if let Some(previous) = self.in_flight.insert(kind, seq) {
            debug!(%kind, previous, seq, "Superseding in-flight request");
        }
        self.latest.insert(kind, seq);
        seq
    }

    /// Whether `response` answers the latest request of its kind.
    ///
    /// Accepting a response clears the kind's loading state, whether it
    /// carries data or a failure.
    pub fn accept(&mut self, response: &Response) -> bool {
        let latest = self.latest.get(&response.kind).copied();
        if latest != Some(response.seq) {
            warn!(
                kind = %response.kind,
                seq = response.seq,
                latest = ?latest,
                "Discarding stale response"
            );
            return false;
        }
        self.in_flight.remove(&response.kind);
        true
    }

    /// Whether a request of `kind` is awaiting its response.
    pub fn is_loading(&self, kind: RequestKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    /// Whether any request is awaiting its response.
    pub fn any_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Stop waiting for `kind`; a late response will be discarded.
    pub fn cancel(&mut self, kind: RequestKind) {
        if self.in_flight.remove(&kind).is_some() {
            // bump so the pending id no longer matches
            self.next += 1;
            self.latest.insert(kind, self.next);
        }
    }
}
