//! Beacon - the periodic driver
//!
//! Two independent periodic actions:
//! - fetch tick: expire silent runners, then start a fetch chain for every
//!   remaining runner that is not already draining
//! - post tick: drain unposted board entries to the output collaborator

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use bigboard_roster::{MessageFetcher, RosterManager, SharedBoard};
use bigboard_transport::Face;

use crate::Emit;

/// Counters shared between a beacon and its client
#[derive(Debug, Default)]
pub struct BeaconCounters {
    pub ticks: AtomicU64,
    pub posted: AtomicU64,
}

/// Periodic fetch and post driver
pub struct Beacon<F, E> {
    roster: RosterManager<F>,
    fetcher: MessageFetcher<F>,
    board: SharedBoard,
    emitter: E,
    beacon_interval: Duration,
    post_interval: Duration,
    counters: Arc<BeaconCounters>,
}

impl<F: Face, E: Emit> Beacon<F, E> {
    pub fn new(
        roster: RosterManager<F>,
        fetcher: MessageFetcher<F>,
        emitter: E,
        beacon_interval: Duration,
        post_interval: Duration,
    ) -> Self {
        let board = Arc::clone(fetcher.board());
        Beacon {
            roster,
            fetcher,
            board,
            emitter,
            beacon_interval,
            post_interval,
            counters: Arc::new(BeaconCounters::default()),
        }
    }

    pub(crate) fn with_counters(mut self, counters: Arc<BeaconCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Expire silent runners and poll the rest.
    /// Returns the number of fetch chains started.
    pub fn tick_fetch(&self) -> usize {
        self.counters.ticks.fetch_add(1, Ordering::Relaxed);
        self.roster.expire();
        let tickets = self.roster.tickets();
        let total = tickets.len();
        let started = self.fetcher.poll_all(tickets);
        tracing::trace!(runners = total, started, "fetch tick");
        started
    }

    /// Flush unposted entries in origin order.
    /// Returns the number of lines emitted.
    pub fn tick_post(&mut self) -> usize {
        let lines: Vec<String> = {
            let mut board = self.board.lock();
            board.drain().map(|entry| entry.display_line()).collect()
        };

        for line in &lines {
            self.emitter.emit(line);
        }
        self.counters
            .posted
            .fetch_add(lines.len() as u64, Ordering::Relaxed);
        lines.len()
    }

    /// Run both ticks until `shutdown` flips to true or its sender is
    /// dropped, then flush once more and hand back the emitter.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> E {
        let mut fetch_timer = interval(self.beacon_interval);
        fetch_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut post_timer = interval(self.post_interval);
        post_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(
            beacon_ms = self.beacon_interval.as_millis() as u64,
            post_ms = self.post_interval.as_millis() as u64,
            "beacon started"
        );

        loop {
            tokio::select! {
                _ = fetch_timer.tick() => {
                    self.tick_fetch();
                }
                _ = post_timer.tick() => {
                    self.tick_post();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.tick_post();
        tracing::debug!("beacon stopped");
        self.emitter
    }
}
