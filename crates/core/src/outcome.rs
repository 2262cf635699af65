//! Decision logic for a `done` batch
//!
//! `done` runs `SCARD; SREM...; SCARD` as one atomic unit, then classifies
//! the two cardinalities. Only the caller that observes a non-empty set
//! becoming empty fires the barrier.

/// What a `done` batch did to the pending set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The set was already empty; nothing could be removed
    NothingPending,
    /// Tokens remain outstanding
    Waiting {
        /// Tokens still pending after the batch
        remaining: u64,
    },
    /// The batch removed the last token; this caller fires
    Satisfied,
}

impl Transition {
    /// Classify the cardinalities read before and after the removals
    pub fn from_counts(before: u64, after: u64) -> Self {
        if before == 0 {
            Transition::NothingPending
        } else if after == 0 {
            Transition::Satisfied
        } else {
            Transition::Waiting { remaining: after }
        }
    }
}

/// Result of `Barrier::done`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneOutcome {
    /// The action was dispatched and the barrier destroyed
    Fired,
    /// The barrier is still waiting, or had nothing pending
    NotFired,
}

impl DoneOutcome {
    /// True if this call fired the barrier
    pub fn is_fired(self) -> bool {
        matches!(self, DoneOutcome::Fired)
    }
}

impl From<Transition> for DoneOutcome {
    fn from(t: Transition) -> Self {
        match t {
            Transition::Satisfied => DoneOutcome::Fired,
            Transition::NothingPending | Transition::Waiting { .. } => DoneOutcome::NotFired,
        }
    }
}
