//! Runtime statistics

use bigboard_roster::{FetchStats, RosterStats};

/// Snapshot of client counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub roster: RosterStats,
    pub fetch: FetchStats,
    /// Runners currently on the roster
    pub runners: usize,
    /// Entries held by the chalkboard
    pub entries: usize,
    /// Entries admitted but not yet posted
    pub pending: usize,
    /// Lines handed to the output collaborator
    pub posted: u64,
    pub beacon_ticks: u64,
    pub fingerprints_evicted: u64,
    /// Posted entries dropped from the board history
    pub entries_retired: u64,
}
