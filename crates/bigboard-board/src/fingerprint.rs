//! Content fingerprints and duplicate suppression

use std::collections::{HashSet, VecDeque};
use std::fmt;

use bigboard_core::{RunnerId, Sequence};
use sha2::{Digest, Sha256};

/// Default number of fingerprints remembered before the oldest is evicted
pub const DEFAULT_FINGERPRINT_CAPACITY: usize = 65_536;

/// SHA-256 over (runner id, sequence, raw payload)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint a message. Each field is length-prefixed so that
    /// ("ab", "c") and ("a", "bc") never collide.
    pub fn compute(runner: &RunnerId, seq: &Sequence, payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        for field in [runner.as_str().as_bytes(), seq.as_str().as_bytes(), payload] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field);
        }
        Fingerprint(hasher.finalize().into())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Bounded set of recently admitted fingerprints.
///
/// Once full, admitting a new fingerprint evicts the oldest one.
#[derive(Debug)]
pub struct FingerprintCache {
    seen: HashSet<Fingerprint>,
    order: VecDeque<Fingerprint>,
    capacity: usize,
    evicted: u64,
}

impl FingerprintCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        FingerprintCache {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
            evicted: 0,
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Remember a fingerprint.
    /// Returns true if it was new, false if it was already present.
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        if !self.seen.insert(fingerprint) {
            return false;
        }

        self.order.push_back(fingerprint);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
                self.evicted += 1;
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fingerprints dropped so far to stay within capacity
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new(DEFAULT_FINGERPRINT_CAPACITY)
    }
}
