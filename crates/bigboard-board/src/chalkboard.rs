//! The chalkboard - deduplicated, time-ordered message storage
//!
//! Entries are keyed by `(origin, arrival)`, so iteration is always in
//! ascending origin time and entries with equal origin time keep the order
//! they were admitted in. A separate pending set tracks entries not yet
//! flushed to output.
//!
//! Posted entries are kept as history up to the fingerprint capacity; the
//! oldest posted entry is retired first. Pending entries are never retired.
//! An entry still on the board suppresses its duplicates even after the
//! fingerprint cache has forgotten it.

use std::collections::{BTreeMap, HashSet, VecDeque};

use bigboard_core::Timestamp;

use crate::{BoardEntry, Fingerprint, FingerprintCache, DEFAULT_FINGERPRINT_CAPACITY};

type EntryKey = (Timestamp, u64);

/// Result of offering an entry to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New content, stored and pending output
    Admitted,
    /// Fingerprint already seen, nothing stored
    Duplicate,
}

/// Deduplicating, time-ordered message queue
#[derive(Debug)]
pub struct Chalkboard {
    entries: BTreeMap<EntryKey, BoardEntry>,
    /// Unposted entries and their fingerprints
    pending: BTreeMap<EntryKey, Fingerprint>,
    /// Posted entries, oldest post first
    history: VecDeque<(EntryKey, Fingerprint)>,
    history_capacity: usize,
    /// Fingerprints of every entry currently held
    held: HashSet<Fingerprint>,
    fingerprints: FingerprintCache,
    next_arrival: u64,
    retired: u64,
}

impl Chalkboard {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FINGERPRINT_CAPACITY)
    }

    /// Create a board remembering at most `capacity` fingerprints and
    /// keeping at most `capacity` posted entries
    pub fn with_capacity(capacity: usize) -> Self {
        let fingerprints = FingerprintCache::new(capacity);
        Chalkboard {
            entries: BTreeMap::new(),
            pending: BTreeMap::new(),
            history: VecDeque::new(),
            history_capacity: fingerprints.capacity(),
            held: HashSet::new(),
            fingerprints,
            next_arrival: 0,
            retired: 0,
        }
    }

    /// Admit an entry unless its fingerprint has been seen before
    pub fn admit(&mut self, fingerprint: Fingerprint, entry: BoardEntry) -> Admission {
        if self.held.contains(&fingerprint) || !self.fingerprints.insert(fingerprint) {
            tracing::trace!(%fingerprint, runner = %entry.runner, "duplicate suppressed");
            return Admission::Duplicate;
        }

        let key = (entry.origin, self.next_arrival);
        self.next_arrival += 1;

        tracing::debug!(
            runner = %entry.runner,
            seq = %entry.sequence,
            origin = %entry.origin,
            "admitted"
        );
        self.held.insert(fingerprint);
        self.pending.insert(key, fingerprint);
        self.entries.insert(key, entry);
        Admission::Admitted
    }

    /// Lazily yield unposted entries in ascending origin order, marking each
    /// as posted as it is yielded. Entries not pulled stay pending.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { board: self }
    }

    /// Entries still held, in display order
    pub fn iter(&self) -> impl Iterator<Item = &BoardEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries not yet flushed
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Posted entries dropped to stay within the history capacity
    pub fn retired(&self) -> u64 {
        self.retired
    }

    pub fn fingerprints(&self) -> &FingerprintCache {
        &self.fingerprints
    }

    fn post(&mut self, key: EntryKey, fingerprint: Fingerprint) -> Option<BoardEntry> {
        let entry = self.entries.get_mut(&key)?;
        entry.mark_posted();
        let posted = entry.clone();

        self.history.push_back((key, fingerprint));
        while self.history.len() > self.history_capacity {
            if let Some((old_key, old_fingerprint)) = self.history.pop_front() {
                self.entries.remove(&old_key);
                self.held.remove(&old_fingerprint);
                self.retired += 1;
            }
        }
        Some(posted)
    }
}

impl Default for Chalkboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`Chalkboard::drain`]
pub struct Drain<'a> {
    board: &'a mut Chalkboard,
}

impl Iterator for Drain<'_> {
    type Item = BoardEntry;

    fn next(&mut self) -> Option<BoardEntry> {
        let (key, fingerprint) = self.board.pending.pop_first()?;
        self.board.post(key, fingerprint)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.board.pending.len();
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigboard_core::{RunnerId, Sequence};
    use proptest::prelude::*;

    fn entry(runner: &str, seq: &str, origin: i64, text: &str) -> (Fingerprint, BoardEntry) {
        let runner = RunnerId::new(runner).unwrap();
        let sequence = Sequence::new(seq).unwrap();
        let payload = format!("{origin}%%{text}");
        let fp = Fingerprint::compute(&runner, &sequence, payload.as_bytes());
        (fp, BoardEntry::new(runner, sequence, Timestamp::from_millis(origin), text))
    }

    fn admit(board: &mut Chalkboard, runner: &str, seq: &str, origin: i64, text: &str) -> Admission {
        let (fp, e) = entry(runner, seq, origin, text);
        board.admit(fp, e)
    }

    #[test]
    fn test_duplicate_admission() {
        let mut board = Chalkboard::new();
        assert_eq!(admit(&mut board, "alice", "1", 1_700_000_000_000, "hello"), Admission::Admitted);
        assert_eq!(admit(&mut board, "alice", "1", 1_700_000_000_000, "hello"), Admission::Duplicate);
        assert_eq!(board.len(), 1);
        assert_eq!(board.pending(), 1);
    }

    #[test]
    fn test_drain_in_origin_order_once() {
        let mut board = Chalkboard::new();
        admit(&mut board, "bob", "1", 300, "third");
        admit(&mut board, "alice", "1", 100, "first");
        admit(&mut board, "alice", "2", 200, "second");

        let texts: Vec<String> = board.drain().map(|e| e.text).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(board.iter().all(|e| e.is_posted()));

        assert_eq!(board.drain().count(), 0);
    }

    #[test]
    fn test_equal_origin_keeps_arrival_order() {
        let mut board = Chalkboard::new();
        admit(&mut board, "carol", "1", 500, "c");
        admit(&mut board, "alice", "1", 500, "a");
        admit(&mut board, "bob", "1", 500, "b");

        let texts: Vec<String> = board.drain().map(|e| e.text).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_drain_is_lazy() {
        let mut board = Chalkboard::new();
        admit(&mut board, "alice", "1", 1, "one");
        admit(&mut board, "alice", "2", 2, "two");

        let first = board.drain().next().unwrap();
        assert_eq!(first.text, "one");
        assert_eq!(board.pending(), 1);

        let rest: Vec<String> = board.drain().map(|e| e.text).collect();
        assert_eq!(rest, vec!["two"]);
    }

    #[test]
    fn test_late_early_message_still_drained() {
        let mut board = Chalkboard::new();
        admit(&mut board, "alice", "1", 200, "later");
        assert_eq!(board.drain().count(), 1);

        admit(&mut board, "bob", "1", 100, "earlier");
        let texts: Vec<String> = board.drain().map(|e| e.text).collect();
        assert_eq!(texts, vec!["earlier"]);

        let order: Vec<&str> = board.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(order, vec!["earlier", "later"]);
    }

    #[test]
    fn test_posted_history_is_bounded() {
        let mut board = Chalkboard::with_capacity(4);
        for seq in 0..10 {
            admit(&mut board, "alice", &seq.to_string(), seq, "x");
            assert_eq!(board.drain().count(), 1);
            assert!(board.len() <= 4);
        }
        assert_eq!(board.len(), 4);
        assert_eq!(board.retired(), 6);

        // The newest posts survive
        let kept: Vec<String> = board.iter().map(|e| e.sequence.to_string()).collect();
        assert_eq!(kept, vec!["6", "7", "8", "9"]);
    }

    #[test]
    fn test_pending_entries_are_never_retired() {
        let mut board = Chalkboard::with_capacity(2);
        for seq in 0..5 {
            admit(&mut board, "alice", &seq.to_string(), seq, "x");
        }
        assert_eq!(board.len(), 5);
        assert_eq!(board.drain().count(), 5);
        assert_eq!(board.len(), 2);
        assert_eq!(board.pending(), 0);
    }

    #[test]
    fn test_entry_on_board_suppresses_duplicate_after_cache_eviction() {
        let mut board = Chalkboard::with_capacity(1);
        assert_eq!(admit(&mut board, "alice", "1", 10, "a"), Admission::Admitted);
        assert_eq!(admit(&mut board, "bob", "1", 20, "b"), Admission::Admitted);
        assert_eq!(board.fingerprints().evicted(), 1);

        // alice/1 left the fingerprint cache but is still pending
        assert_eq!(admit(&mut board, "alice", "1", 10, "a"), Admission::Duplicate);
        assert_eq!(board.len(), 2);
        assert_eq!(board.drain().count(), 2);
    }

    fn arb_message() -> impl Strategy<Value = (u8, u8, i64)> {
        (0u8..4, 0u8..16, 0i64..1_000)
    }

    proptest! {
        #[test]
        fn prop_iteration_is_origin_ordered(messages in proptest::collection::vec(arb_message(), 0..64)) {
            let mut board = Chalkboard::new();
            for (runner, seq, origin) in messages {
                admit(&mut board, &format!("r{runner}"), &seq.to_string(), origin, "x");
                let origins: Vec<Timestamp> = board.iter().map(|e| e.origin).collect();
                prop_assert!(origins.windows(2).all(|w| w[0] <= w[1]));
            }
        }

        #[test]
        fn prop_drain_delivers_each_entry_once(
            messages in proptest::collection::vec(arb_message(), 0..64),
            split in 0usize..64,
        ) {
            let mut board = Chalkboard::new();
            let mut unique = std::collections::HashSet::new();
            for (runner, seq, origin) in &messages {
                admit(&mut board, &format!("r{runner}"), &seq.to_string(), *origin, "x");
                unique.insert((*runner, *seq, *origin));
            }

            let mut delivered: Vec<(String, String)> = board
                .drain()
                .take(split)
                .map(|e| (e.runner.to_string(), e.sequence.to_string()))
                .collect();
            delivered.extend(board.drain().map(|e| (e.runner.to_string(), e.sequence.to_string())));
            prop_assert_eq!(board.drain().count(), 0);

            prop_assert_eq!(delivered.len(), unique.len());
            prop_assert_eq!(board.len(), unique.len());
        }

        #[test]
        fn prop_board_stays_within_capacity(
            messages in proptest::collection::vec(arb_message(), 0..64),
            capacity in 1usize..8,
        ) {
            let mut board = Chalkboard::with_capacity(capacity);
            for (runner, seq, origin) in messages {
                admit(&mut board, &format!("r{runner}"), &seq.to_string(), origin, "x");
                board.drain().for_each(drop);
                prop_assert!(board.len() <= capacity);
            }
        }

        #[test]
        fn prop_readmission_is_idempotent(messages in proptest::collection::vec(arb_message(), 0..32)) {
            let mut board = Chalkboard::new();
            for (runner, seq, origin) in &messages {
                admit(&mut board, &format!("r{runner}"), &seq.to_string(), *origin, "x");
            }
            let before = board.len();
            for (runner, seq, origin) in &messages {
                let outcome = admit(&mut board, &format!("r{runner}"), &seq.to_string(), *origin, "x");
                prop_assert_eq!(outcome, Admission::Duplicate);
            }
            prop_assert_eq!(board.len(), before);
        }
    }
}
