//! Seek barrier: join the completions of a group seek.

use mediasyncer_core::{MediaId, SeekTicket};
use smallvec::SmallVec;

/// Outstanding seeks of one group jump.
///
/// Each entry is the ticket an element returned for its part of the jump.
/// A completion counts only if its ticket is at least the recorded one, so
/// a late completion of an older seek on the same element is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekBarrier {
    pending: SmallVec<[(MediaId, SeekTicket); 4]>,
    /// Resume playback once every seek has landed
    pub resume: bool,
    target: f64,
}

impl SeekBarrier {
    pub fn new(target: f64, resume: bool) -> Self {
        Self {
            pending: SmallVec::new(),
            resume,
            target,
        }
    }

    /// Register a seek issued by `id`.
    pub fn expect(&mut self, id: MediaId, ticket: SeekTicket) {
        match self.pending.iter_mut().find(|(pid, _)| *pid == id) {
            Some(entry) => entry.1 = entry.1.max(ticket),
            None => self.pending.push((id, ticket)),
        }
    }

    /// Record a completion. Returns true if it settled a pending entry.
    pub fn complete(&mut self, id: MediaId, ticket: SeekTicket) -> bool {
        let before = self.pending.len();
        self.pending
            .retain(|(pid, expected)| !(*pid == id && ticket >= *expected));
        self.pending.len() != before
    }

    /// Drop a media that will never report (removed or failed).
    pub fn forget(&mut self, id: MediaId) {
        self.pending.retain(|(pid, _)| *pid != id);
    }

    pub fn is_resolved(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Time the group was sent to.
    pub fn target(&self) -> f64 {
        self.target
    }
}
