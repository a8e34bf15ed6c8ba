//! Roster manager - discovery chain and liveness expiry
//!
//! Discovery enumerates the users namespace one id per round trip: ask for
//! the highest child not yet excluded, record it, exclude it, ask again.
//! When a round times out the same filter is reissued, so late joiners and
//! previously missed runners still surface.
//!
//! Enumeration runs in sweeps. The filter only grows within a sweep. Once a
//! sweep is older than the sweep interval and a round comes back empty, the
//! next sweep starts from an empty filter, so every live runner is reported
//! again and its liveness refreshed well inside the expiry window.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use bigboard_core::{BoardError, BoardResult, Component, Exclude, RunnerId, Sequence, Timestamp};
use bigboard_transport::{ChildSelector, Data, Face, Interest};

use crate::{Roster, RosterConfig, RunnerTicket, Upsert};

/// Counters kept by the roster manager
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterStats {
    pub discovery_queries: u64,
    pub discovery_timeouts: u64,
    pub announcements: u64,
    pub stale_announcements: u64,
    pub joined: u64,
    pub refreshed: u64,
    pub expired: u64,
    /// Discovery sweeps started, the first one included
    pub sweeps: u64,
}

/// Owns the roster and every runner's exclusion state
pub struct RosterManager<F> {
    face: Arc<F>,
    config: RosterConfig,
    roster: Arc<Mutex<Roster>>,
    stats: Arc<Mutex<RosterStats>>,
}

impl<F> Clone for RosterManager<F> {
    fn clone(&self) -> Self {
        RosterManager {
            face: Arc::clone(&self.face),
            config: self.config.clone(),
            roster: Arc::clone(&self.roster),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<F: Face> RosterManager<F> {
    pub fn new(face: Arc<F>, config: RosterConfig) -> Self {
        RosterManager {
            face,
            config,
            roster: Arc::new(Mutex::new(Roster::new())),
            stats: Arc::new(Mutex::new(RosterStats::default())),
        }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Interest for the next unseen runner
    pub fn discovery_interest(&self, exclude: &Exclude) -> Interest {
        Interest::new(self.config.users_prefix.clone())
            .with_selector(ChildSelector::Highest)
            .with_exclude(exclude.clone())
            .with_lifetime(self.config.discovery_lifetime)
            .with_must_be_fresh(true)
    }

    /// Run the discovery chain until the face closes.
    ///
    /// `exclude` seeds the first sweep; later sweeps start empty. A round
    /// waits for at most the interest lifetime, and never past the end of
    /// the current sweep.
    ///
    /// Never returns `Ok`; the error is `FaceClosed` on orderly shutdown of
    /// the substrate.
    pub async fn discover(&self, mut exclude: Exclude) -> BoardResult<()> {
        let sweep_interval = self.config.sweep_interval();
        let mut sweep_ends = Instant::now() + sweep_interval;
        self.stats.lock().sweeps += 1;

        loop {
            let interest = self.discovery_interest(&exclude);
            self.stats.lock().discovery_queries += 1;
            tracing::debug!(excluded = exclude.len(), "discovery interest");

            let wait = self
                .config
                .discovery_lifetime
                .min(sweep_ends.saturating_duration_since(Instant::now()));
            let result = tokio::time::timeout(wait, self.face.express_interest(interest))
                .await
                .unwrap_or(Err(BoardError::InterestTimeout));

            match result {
                Ok(data) => {
                    if let Some(id) = self.on_discovery(&data, Timestamp::now()) {
                        exclude = exclude.extend(id);
                    }
                }
                Err(BoardError::InterestTimeout) => {
                    self.stats.lock().discovery_timeouts += 1;
                    if Instant::now() >= sweep_ends {
                        tracing::trace!(seen = exclude.len(), "discovery sweep finished");
                        exclude = Exclude::new();
                        sweep_ends = Instant::now() + sweep_interval;
                        self.stats.lock().sweeps += 1;
                    } else {
                        tracing::trace!("discovery round timed out, reissuing");
                    }
                }
                Err(BoardError::FaceClosed) => {
                    tracing::debug!("face closed, discovery stopped");
                    return Err(BoardError::FaceClosed);
                }
                Err(e) => {
                    tracing::warn!("discovery failed: {}", e);
                    tokio::time::sleep(self.config.discovery_lifetime).await;
                }
            }
        }
    }

    /// Apply one discovery response.
    ///
    /// Returns the id component to add to the discovery filter, or None if
    /// the response did not name a runner.
    pub fn on_discovery(&self, data: &Data, now: Timestamp) -> Option<Component> {
        let prefix = &self.config.users_prefix;
        let Some(component) = prefix.child_of(data.name()) else {
            tracing::warn!(name = %data.name(), "discovery response outside users prefix");
            return None;
        };
        let id = RunnerId::from(component.clone());
        self.stats.lock().announcements += 1;

        // No liveness component means the runner is alive right now
        let seen = match data.name().get(prefix.len() + 1) {
            None => Some(now),
            Some(field) => match Timestamp::parse_millis(field.as_str()) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    tracing::debug!(runner = %id, "unreadable liveness: {}", e);
                    None
                }
            },
        };

        let cutoff = now - self.config.expiry_window;
        let outcome = match seen {
            Some(seen) => self.roster.lock().upsert(id.clone(), seen, cutoff),
            None => Upsert::Stale,
        };

        match outcome {
            Upsert::Joined(epoch) => {
                self.stats.lock().joined += 1;
                tracing::info!(runner = %id, epoch, "runner joined");
            }
            Upsert::Refreshed => {
                self.stats.lock().refreshed += 1;
                tracing::trace!(runner = %id, "runner refreshed");
            }
            Upsert::Unchanged => {}
            Upsert::Stale => {
                self.stats.lock().stale_announcements += 1;
                tracing::debug!(runner = %id, "stale announcement ignored");
            }
        }

        Some(component.clone())
    }

    /// Drop runners whose last liveness signal is outside the expiry window
    pub fn expire(&self) -> Vec<RunnerId> {
        self.expire_at(Timestamp::now())
    }

    /// `expire` against an explicit clock
    pub fn expire_at(&self, now: Timestamp) -> Vec<RunnerId> {
        let cutoff = now - self.config.expiry_window;
        let expired = self.roster.lock().expire(cutoff);

        if !expired.is_empty() {
            self.stats.lock().expired += expired.len() as u64;
            for id in &expired {
                tracing::info!(runner = %id, "runner expired");
            }
        }
        expired
    }

    /// Apply a liveness announcement directly
    pub fn announce(&self, id: RunnerId, seen: Timestamp, now: Timestamp) -> Upsert {
        let cutoff = now - self.config.expiry_window;
        self.roster.lock().upsert(id, seen, cutoff)
    }

    /// Extend a runner's exclusion state; false if the ticket is out of date
    pub fn record_sequence(&self, ticket: &RunnerTicket, seq: &Sequence) -> bool {
        self.roster
            .lock()
            .record_sequence(&ticket.id, ticket.epoch, seq)
    }

    pub fn is_current(&self, ticket: &RunnerTicket) -> bool {
        self.roster.lock().is_current(&ticket.id, ticket.epoch)
    }

    /// Tickets for every live runner
    pub fn tickets(&self) -> Vec<RunnerTicket> {
        self.roster.lock().tickets()
    }

    /// Current exclusion state of a runner
    pub fn exclusion(&self, id: &RunnerId) -> Option<Exclude> {
        self.roster.lock().get(id).map(|r| r.exclude.clone())
    }

    pub fn last_seen(&self, id: &RunnerId) -> Option<Timestamp> {
        self.roster.lock().get(id).map(|r| r.last_seen)
    }

    pub fn len(&self) -> usize {
        self.roster.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.lock().is_empty()
    }

    pub fn stats(&self) -> RosterStats {
        self.stats.lock().clone()
    }
}
