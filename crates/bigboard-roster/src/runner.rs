//! Runner records

use bigboard_core::{Exclude, RunnerId, Sequence, Timestamp};

/// An active participant being tracked for liveness and message polling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Runner {
    pub id: RunnerId,
    /// Most recent liveness signal
    pub last_seen: Timestamp,
    /// Sequences already retrieved for this runner
    pub exclude: Exclude,
    /// Generation assigned when this record was created
    pub epoch: u64,
}

impl Runner {
    pub fn new(id: RunnerId, last_seen: Timestamp, epoch: u64) -> Self {
        Runner {
            id,
            last_seen,
            exclude: Exclude::new(),
            epoch,
        }
    }

    /// Check whether this runner is still alive at `cutoff`
    #[inline]
    pub fn is_alive(&self, cutoff: Timestamp) -> bool {
        self.last_seen >= cutoff
    }

    /// Start a fetch chain from this runner's current state
    pub fn ticket(&self) -> RunnerTicket {
        RunnerTicket {
            id: self.id.clone(),
            epoch: self.epoch,
            exclude: self.exclude.clone(),
        }
    }

    pub(crate) fn record_sequence(&mut self, seq: &Sequence) {
        self.exclude = self.exclude.extend(seq.as_component().clone());
    }
}

/// Snapshot of a runner handed to a fetch chain.
///
/// The chain extends its own copy of the exclusion filter; the epoch lets the
/// roster reject responses for a runner that has since expired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerTicket {
    pub id: RunnerId,
    pub epoch: u64,
    pub exclude: Exclude,
}
