//! In-process loopback substrate
//!
//! `MemoryFace` holds a content store and answers interests from it with
//! the semantics the client relies on: prefix match, exclusion of the next
//! component, lowest/highest child selection and must-be-fresh. An interest
//! with no match waits until a later insert satisfies it or its lifetime
//! runs out.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use bigboard_core::{BoardError, BoardResult, Name};

use crate::{ChildSelector, Data, Face, Interest};

struct StoredData {
    data: Data,
    inserted_at: Instant,
}

impl StoredData {
    fn is_fresh(&self, now: Instant) -> bool {
        self.data
            .freshness()
            .is_some_and(|f| now.duration_since(self.inserted_at) < f)
    }
}

#[derive(Default)]
struct Inner {
    store: Mutex<BTreeMap<Name, StoredData>>,
    arrivals: Notify,
    closed: AtomicBool,
}

impl Inner {
    fn lookup(&self, interest: &Interest) -> Option<Data> {
        let now = Instant::now();
        let store = self.store.lock();

        let candidates = store.values().filter_map(|stored| {
            let child = interest.name().child_of(stored.data.name())?;
            if interest.exclude().contains(child) {
                return None;
            }
            if interest.must_be_fresh() && !stored.is_fresh(now) {
                return None;
            }
            Some((child, &stored.data))
        });

        let chosen = match interest.selector() {
            ChildSelector::Lowest => candidates.min_by(|a, b| a.0.cmp(b.0)),
            ChildSelector::Highest => candidates.max_by(|a, b| a.0.cmp(b.0)),
        };

        chosen.map(|(_, data)| data.clone())
    }

    async fn wait_for(&self, interest: &Interest) -> BoardResult<Data> {
        loop {
            let notified = self.arrivals.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.closed.load(Ordering::Acquire) {
                return Err(BoardError::FaceClosed);
            }
            if let Some(data) = self.lookup(interest) {
                return Ok(data);
            }

            notified.await;
        }
    }
}

/// Loopback substrate backed by an in-memory content store
#[derive(Clone, Default)]
pub struct MemoryFace {
    inner: Arc<Inner>,
}

impl MemoryFace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store data, replacing any data with the same name, and wake pending
    /// interests
    pub fn insert(&self, data: Data) {
        tracing::trace!(name = %data.name(), "content store insert");
        self.inner.store.lock().insert(
            data.name().clone(),
            StoredData {
                data,
                inserted_at: Instant::now(),
            },
        );
        self.inner.arrivals.notify_waiters();
    }

    /// Remove data by exact name
    pub fn remove(&self, name: &Name) -> Option<Data> {
        self.inner.store.lock().remove(name).map(|s| s.data)
    }

    /// Remove every entry under `prefix`
    pub fn remove_prefix(&self, prefix: &Name) -> usize {
        let mut store = self.inner.store.lock();
        let before = store.len();
        store.retain(|name, _| !prefix.is_prefix_of(name));
        before - store.len()
    }

    pub fn len(&self) -> usize {
        self.inner.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.lock().is_empty()
    }

    /// Fail all pending and future interests with `FaceClosed`
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.arrivals.notify_waiters();
    }
}

impl Face for MemoryFace {
    fn express_interest(
        &self,
        interest: Interest,
    ) -> impl Future<Output = BoardResult<Data>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            match tokio::time::timeout(interest.lifetime(), inner.wait_for(&interest)).await {
                Ok(result) => result,
                Err(_) => Err(BoardError::InterestTimeout),
            }
        }
    }
}
