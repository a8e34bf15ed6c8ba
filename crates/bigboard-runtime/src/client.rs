//! Client - owns the components and runs them together

use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use bigboard_board::Chalkboard;
use bigboard_core::{BoardResult, Exclude};
use bigboard_roster::{MessageFetcher, RosterManager, SharedBoard};
use bigboard_transport::Face;

use crate::{Beacon, BeaconCounters, BoardConfig, BoardStats, Emit};

/// A BigBoard client bound to one face
pub struct Client<F> {
    config: BoardConfig,
    roster: RosterManager<F>,
    fetcher: MessageFetcher<F>,
    board: SharedBoard,
    counters: Arc<BeaconCounters>,
}

impl<F: Face> Client<F> {
    pub fn new(face: Arc<F>, config: BoardConfig) -> BoardResult<Self> {
        config.validate()?;

        let board: SharedBoard = Arc::new(Mutex::new(Chalkboard::with_capacity(
            config.fingerprint_capacity,
        )));
        let roster = RosterManager::new(Arc::clone(&face), config.roster_config());
        let fetcher = MessageFetcher::new(
            face,
            config.fetch_config(),
            roster.clone(),
            Arc::clone(&board),
        );

        Ok(Client {
            config,
            roster,
            fetcher,
            board,
            counters: Arc::new(BeaconCounters::default()),
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn roster(&self) -> &RosterManager<F> {
        &self.roster
    }

    pub fn fetcher(&self) -> &MessageFetcher<F> {
        &self.fetcher
    }

    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    /// A beacon driving this client's components
    pub fn beacon<E: Emit>(&self, emitter: E) -> Beacon<F, E> {
        Beacon::new(
            self.roster.clone(),
            self.fetcher.clone(),
            emitter,
            self.config.beacon_interval,
            self.config.post_interval,
        )
        .with_counters(Arc::clone(&self.counters))
    }

    /// Run discovery and the beacon until `shutdown` fires.
    ///
    /// Returns the emitter once the final flush is done.
    pub async fn run<E: Emit>(&self, emitter: E, shutdown: watch::Receiver<bool>) -> E {
        let roster = self.roster.clone();
        let discovery = tokio::spawn(async move {
            if let Err(e) = roster.discover(Exclude::new()).await {
                tracing::debug!("discovery ended: {}", e);
            }
        });

        tracing::info!(
            users = %self.config.users_prefix,
            messages = %self.config.messages_prefix,
            "client started"
        );
        let emitter = self.beacon(emitter).run(shutdown).await;

        discovery.abort();
        tracing::info!("client stopped");
        emitter
    }

    pub fn stats(&self) -> BoardStats {
        let board = self.board.lock();
        BoardStats {
            roster: self.roster.stats(),
            fetch: self.fetcher.stats(),
            runners: self.roster.len(),
            entries: board.len(),
            pending: board.pending(),
            posted: self.counters.posted.load(Ordering::Relaxed),
            beacon_ticks: self.counters.ticks.load(Ordering::Relaxed),
            fingerprints_evicted: board.fingerprints().evicted(),
            entries_retired: board.retired(),
        }
    }
}
