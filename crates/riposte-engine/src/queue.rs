//! Matchmaking queue: a FIFO of endpoints awaiting an opponent.
//!
//! Pairing is greedy and immediate — the queue never holds more than one
//! waiting player under normal load, because the second arrival is paired
//! on the spot. That is a deliberate simplicity trade-off: no skill-based
//! matching, no fairness beyond arrival order.

use std::collections::VecDeque;

use riposte_protocol::EndpointId;

/// One endpoint waiting for an opponent, with the metadata it joined with.
///
/// Lives from the join request until the moment it is popped to form a
/// pairing, or until the endpoint disconnects.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub endpoint: EndpointId,
    pub metadata: Option<serde_json::Value>,
}

/// A completed pairing: the entry that was waiting plus the new arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    /// The entry that was already in the queue (joined first).
    pub first: QueueEntry,
    /// The arrival that triggered the pairing.
    pub second: QueueEntry,
}

/// FIFO matchmaking queue.
///
/// The queue only returns data — it performs no emission. Acting on a
/// pairing (creating the session, notifying both sides) is the engine's
/// job.
#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<QueueEntry>,
}

impl MatchQueue {
    /// Creates a new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, or completes a pairing if someone was waiting.
    ///
    /// If the queue was non-empty the oldest waiter is popped and returned
    /// together with the new arrival; the new arrival is never stored. An
    /// endpoint that is already waiting is not enqueued twice (and cannot
    /// be paired with itself) — the repeat join is a no-op.
    pub fn enqueue(&mut self, entry: QueueEntry) -> Option<Pairing> {
        if self.contains(entry.endpoint) {
            return None;
        }
        match self.waiting.pop_front() {
            Some(first) => Some(Pairing { first, second: entry }),
            None => {
                self.waiting.push_back(entry);
                None
            }
        }
    }

    /// Removes a specific endpoint from the queue (used on disconnect).
    ///
    /// Returns `true` if the endpoint was waiting; no-op otherwise. The
    /// queue is expected to stay tiny, so the linear scan is fine.
    pub fn remove(&mut self, endpoint: EndpointId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|entry| entry.endpoint != endpoint);
        self.waiting.len() != before
    }

    /// Returns `true` if the endpoint is currently waiting.
    pub fn contains(&self, endpoint: EndpointId) -> bool {
        self.waiting.iter().any(|entry| entry.endpoint == endpoint)
    }

    /// Number of endpoints currently waiting.
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    /// Returns `true` if nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
