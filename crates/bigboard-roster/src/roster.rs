//! The roster - ordered set of live runners
//!
//! At most one runner per id. Expiry rebuilds the collection instead of
//! splicing it during traversal.

use bigboard_core::{RunnerId, Sequence, Timestamp};

use crate::{Runner, RunnerTicket};

/// Effect of a liveness announcement on the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// New runner added with the given epoch
    Joined(u64),
    /// Existing runner's last_seen moved forward
    Refreshed,
    /// Existing runner already had an equal or newer last_seen
    Unchanged,
    /// Announcement older than the cutoff, ignored
    Stale,
}

/// Live runners in discovery order
#[derive(Debug, Default)]
pub struct Roster {
    runners: Vec<Runner>,
    next_epoch: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a liveness announcement
    pub fn upsert(&mut self, id: RunnerId, seen: Timestamp, cutoff: Timestamp) -> Upsert {
        if seen < cutoff {
            return Upsert::Stale;
        }

        if let Some(runner) = self.runners.iter_mut().find(|r| r.id == id) {
            if seen > runner.last_seen {
                runner.last_seen = seen;
                return Upsert::Refreshed;
            }
            return Upsert::Unchanged;
        }

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.runners.push(Runner::new(id, seen, epoch));
        Upsert::Joined(epoch)
    }

    /// Drop every runner last seen before `cutoff`, returning the dropped ids
    pub fn expire(&mut self, cutoff: Timestamp) -> Vec<RunnerId> {
        let (alive, expired): (Vec<Runner>, Vec<Runner>) = std::mem::take(&mut self.runners)
            .into_iter()
            .partition(|r| r.is_alive(cutoff));

        self.runners = alive;
        expired.into_iter().map(|r| r.id).collect()
    }

    /// Extend a runner's exclusion state with a retrieved sequence.
    ///
    /// Returns false when the runner is gone or has been recreated since the
    /// epoch was issued; the caller must then discard the response.
    pub fn record_sequence(&mut self, id: &RunnerId, epoch: u64, seq: &Sequence) -> bool {
        match self.runners.iter_mut().find(|r| &r.id == id) {
            Some(runner) if runner.epoch == epoch => {
                runner.record_sequence(seq);
                true
            }
            _ => false,
        }
    }

    /// Check whether a ticket still refers to the current runner record
    pub fn is_current(&self, id: &RunnerId, epoch: u64) -> bool {
        self.get(id).is_some_and(|r| r.epoch == epoch)
    }

    pub fn get(&self, id: &RunnerId) -> Option<&Runner> {
        self.runners.iter().find(|r| &r.id == id)
    }

    /// Tickets for every live runner, in discovery order
    pub fn tickets(&self) -> Vec<RunnerTicket> {
        self.runners.iter().map(Runner::ticket).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Runner> {
        self.runners.iter()
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> RunnerId {
        RunnerId::new(s).unwrap()
    }

    fn ts(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn test_upsert_join_refresh() {
        let mut roster = Roster::new();
        assert_eq!(roster.upsert(id("alice"), ts(100), ts(0)), Upsert::Joined(0));
        assert_eq!(roster.upsert(id("bob"), ts(100), ts(0)), Upsert::Joined(1));
        assert_eq!(roster.upsert(id("alice"), ts(200), ts(0)), Upsert::Refreshed);
        assert_eq!(roster.upsert(id("alice"), ts(150), ts(0)), Upsert::Unchanged);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(&id("alice")).unwrap().last_seen, ts(200));
    }

    #[test]
    fn test_stale_announcement_ignored() {
        let mut roster = Roster::new();
        assert_eq!(roster.upsert(id("alice"), ts(99), ts(100)), Upsert::Stale);
        assert!(roster.is_empty());
        assert_eq!(roster.upsert(id("alice"), ts(100), ts(100)), Upsert::Joined(0));
    }

    #[test]
    fn test_expire_boundary() {
        let mut roster = Roster::new();
        let cutoff = ts(60_000);
        roster.upsert(id("gone"), ts(59_999), ts(0));
        roster.upsert(id("edge"), ts(60_000), ts(0));
        roster.upsert(id("kept"), ts(60_001), ts(0));

        let expired = roster.expire(cutoff);
        assert_eq!(expired, vec![id("gone")]);
        let left: Vec<&str> = roster.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(left, vec!["edge", "kept"]);
    }

    #[test]
    fn test_expire_adjacent_runners() {
        let mut roster = Roster::new();
        for name in ["a", "b", "c", "d", "e"] {
            roster.upsert(id(name), ts(10), ts(0));
        }
        roster.upsert(id("c"), ts(500), ts(0));

        let expired = roster.expire(ts(100));
        assert_eq!(expired.len(), 4);
        assert_eq!(roster.len(), 1);
        assert!(roster.get(&id("c")).is_some());
    }

    #[test]
    fn test_record_sequence_checks_epoch() {
        let mut roster = Roster::new();
        let Upsert::Joined(old_epoch) = roster.upsert(id("alice"), ts(10), ts(0)) else {
            panic!("expected join");
        };
        let seq = Sequence::new("1").unwrap();

        assert!(roster.record_sequence(&id("alice"), old_epoch, &seq));
        assert_eq!(roster.get(&id("alice")).unwrap().exclude.len(), 1);

        roster.expire(ts(100));
        assert!(!roster.record_sequence(&id("alice"), old_epoch, &seq));

        let Upsert::Joined(new_epoch) = roster.upsert(id("alice"), ts(200), ts(0)) else {
            panic!("expected join");
        };
        assert_ne!(old_epoch, new_epoch);
        assert!(!roster.is_current(&id("alice"), old_epoch));
        assert!(roster.get(&id("alice")).unwrap().exclude.is_empty());
        assert!(!roster.record_sequence(&id("alice"), old_epoch, &seq));
    }

    proptest! {
        #[test]
        fn prop_one_runner_per_id(events in proptest::collection::vec((0u8..6, 0i64..1_000), 0..100)) {
            let mut roster = Roster::new();
            for (n, seen) in events {
                roster.upsert(id(&format!("r{n}")), ts(seen), ts(200));
                if seen % 7 == 0 {
                    roster.expire(ts(seen / 2));
                }
            }
            let mut ids: Vec<&str> = roster.iter().map(|r| r.id.as_str()).collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }

        #[test]
        fn prop_expire_keeps_exactly_live(seen in proptest::collection::vec(0i64..1_000, 0..50), cutoff in 0i64..1_000) {
            let mut roster = Roster::new();
            for (i, s) in seen.iter().enumerate() {
                roster.upsert(id(&format!("r{i}")), ts(*s), ts(0));
            }
            let expired = roster.expire(ts(cutoff));
            let expected_live = seen.iter().filter(|s| **s >= cutoff).count();
            prop_assert_eq!(roster.len(), expected_live);
            prop_assert_eq!(expired.len(), seen.len() - expected_live);
            prop_assert!(roster.iter().all(|r| r.last_seen >= ts(cutoff)));
        }
    }
}
