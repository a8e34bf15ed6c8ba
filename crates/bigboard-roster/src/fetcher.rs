//! Message fetcher - per-runner message enumeration
//!
//! A fetch chain asks for the lowest unexcluded child of
//! `<messages>/<runner>`, hands the decoded message to the chalkboard,
//! excludes the returned sequence and asks again. The first timeout ends
//! the chain; the beacon starts a new one on a later tick.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use bigboard_board::{decode_payload, Admission, BoardEntry, Chalkboard, Fingerprint};
use bigboard_core::{BoardError, Exclude, Name, RunnerId, Sequence};
use bigboard_transport::{ChildSelector, Data, Face, Interest};

use crate::{FetchConfig, RosterManager, RunnerTicket};

/// Chalkboard shared between the fetcher (admit) and the beacon (drain)
pub type SharedBoard = Arc<Mutex<Chalkboard>>;

/// What one fetch response did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// New message admitted to the board
    Admitted,
    /// Fingerprint already seen
    Duplicate,
    /// Payload could not be decoded; sequence still excluded
    Malformed,
    /// Response no longer matches a current runner, or names the wrong
    /// runner; ignored and the chain ends
    Stale,
}

/// Counters kept by the fetcher
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub queries: u64,
    pub timeouts: u64,
    pub admitted: u64,
    pub duplicates: u64,
    pub malformed: u64,
    pub stale: u64,
    pub skipped_busy: u64,
}

impl FetchStats {
    fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Admitted => self.admitted += 1,
            FetchOutcome::Duplicate => self.duplicates += 1,
            FetchOutcome::Malformed => self.malformed += 1,
            FetchOutcome::Stale => self.stale += 1,
        }
    }
}

/// Enumerates messages for roster runners into the chalkboard
pub struct MessageFetcher<F> {
    face: Arc<F>,
    config: FetchConfig,
    roster: RosterManager<F>,
    board: SharedBoard,
    in_flight: Arc<Mutex<HashSet<RunnerId>>>,
    stats: Arc<Mutex<FetchStats>>,
}

impl<F> Clone for MessageFetcher<F> {
    fn clone(&self) -> Self {
        MessageFetcher {
            face: Arc::clone(&self.face),
            config: self.config.clone(),
            roster: self.roster.clone(),
            board: Arc::clone(&self.board),
            in_flight: Arc::clone(&self.in_flight),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<F: Face> MessageFetcher<F> {
    pub fn new(face: Arc<F>, config: FetchConfig, roster: RosterManager<F>, board: SharedBoard) -> Self {
        MessageFetcher {
            face,
            config,
            roster,
            board,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            stats: Arc::new(Mutex::new(FetchStats::default())),
        }
    }

    /// `<messages>/<runner>`
    pub fn mailbox(&self, id: &RunnerId) -> Name {
        self.config
            .messages_prefix
            .clone()
            .append(id.as_component().clone())
    }

    /// Interest for the next unseen message of a runner
    pub fn message_interest(&self, id: &RunnerId, exclude: &Exclude) -> Interest {
        Interest::new(self.mailbox(id))
            .with_selector(ChildSelector::Lowest)
            .with_exclude(exclude.clone())
            .with_lifetime(self.config.fetch_lifetime)
    }

    /// Drain every currently available message for one runner.
    ///
    /// Returns the number of responses processed before the chain ended.
    pub async fn fetch_messages(&self, mut ticket: RunnerTicket) -> usize {
        let mut processed = 0;

        loop {
            if !self.roster.is_current(&ticket) {
                tracing::debug!(runner = %ticket.id, "runner left, fetch chain stopped");
                break;
            }

            let interest = self.message_interest(&ticket.id, &ticket.exclude);
            self.stats.lock().queries += 1;
            tracing::trace!(runner = %ticket.id, excluded = ticket.exclude.len(), "message interest");

            let result = tokio::time::timeout(
                self.config.fetch_lifetime,
                self.face.express_interest(interest),
            )
            .await
            .unwrap_or(Err(BoardError::InterestTimeout));

            let data = match result {
                Ok(data) => data,
                Err(BoardError::InterestTimeout) => {
                    self.stats.lock().timeouts += 1;
                    break;
                }
                Err(BoardError::FaceClosed) => break,
                Err(e) => {
                    tracing::warn!(runner = %ticket.id, "fetch failed: {}", e);
                    break;
                }
            };

            processed += 1;
            match self.on_message(&ticket, &data) {
                Ok((_, seq)) => {
                    ticket.exclude = ticket.exclude.extend(seq.as_component().clone());
                }
                Err(_) => break,
            }
        }

        processed
    }

    /// Apply one fetch response.
    ///
    /// On success returns the outcome and the sequence that must be added to
    /// the chain's exclusion filter. `Err(Stale)` means the response belongs
    /// to a runner record that is gone and must not extend anything.
    pub fn on_message(
        &self,
        ticket: &RunnerTicket,
        data: &Data,
    ) -> Result<(FetchOutcome, Sequence), FetchOutcome> {
        let outcome = self.apply(ticket, data);
        match &outcome {
            Ok((o, _)) => self.stats.lock().record(*o),
            Err(o) => self.stats.lock().record(*o),
        }
        outcome
    }

    fn apply(
        &self,
        ticket: &RunnerTicket,
        data: &Data,
    ) -> Result<(FetchOutcome, Sequence), FetchOutcome> {
        let mailbox = self.mailbox(&ticket.id);
        let Some(component) = mailbox.child_of(data.name()) else {
            tracing::warn!(runner = %ticket.id, name = %data.name(), "response outside mailbox");
            return Err(FetchOutcome::Stale);
        };
        let seq = Sequence::from(component.clone());

        if !self.roster.record_sequence(ticket, &seq) {
            tracing::debug!(runner = %ticket.id, seq = %seq, "late response for departed runner");
            return Err(FetchOutcome::Stale);
        }

        let payload = data.content();
        let message = match decode_payload(payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(runner = %ticket.id, seq = %seq, "discarding message: {}", e);
                return Ok((FetchOutcome::Malformed, seq));
            }
        };

        let fingerprint = Fingerprint::compute(&ticket.id, &seq, payload);
        let entry = BoardEntry::from_decoded(ticket.id.clone(), seq.clone(), message);

        let outcome = match self.board.lock().admit(fingerprint, entry) {
            Admission::Admitted => FetchOutcome::Admitted,
            Admission::Duplicate => FetchOutcome::Duplicate,
        };
        Ok((outcome, seq))
    }

    /// Start a fetch chain for a runner unless one is already draining.
    ///
    /// Returns None when the runner already has a chain in flight.
    pub fn spawn_fetch(&self, ticket: RunnerTicket) -> Option<JoinHandle<usize>> {
        let guard = InFlight::acquire(&self.in_flight, &ticket.id)?;
        let fetcher = self.clone();

        Some(tokio::spawn(async move {
            let _guard = guard;
            fetcher.fetch_messages(ticket).await
        }))
    }

    /// Start chains for every ticket, skipping busy runners
    pub fn poll_all(&self, tickets: Vec<RunnerTicket>) -> usize {
        let mut started = 0;
        for ticket in tickets {
            if self.spawn_fetch(ticket).is_some() {
                started += 1;
            } else {
                self.stats.lock().skipped_busy += 1;
            }
        }
        started
    }

    /// Check whether a runner currently has a chain in flight
    pub fn is_fetching(&self, id: &RunnerId) -> bool {
        self.in_flight.lock().contains(id)
    }

    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    pub fn stats(&self) -> FetchStats {
        self.stats.lock().clone()
    }
}

/// Marks a runner as having a chain in flight until dropped
struct InFlight {
    set: Arc<Mutex<HashSet<RunnerId>>>,
    id: RunnerId,
}

impl InFlight {
    fn acquire(set: &Arc<Mutex<HashSet<RunnerId>>>, id: &RunnerId) -> Option<Self> {
        if !set.lock().insert(id.clone()) {
            return None;
        }
        Some(InFlight {
            set: Arc::clone(set),
            id: id.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigboard_core::Timestamp;
    use bigboard_transport::{MemoryFace, RecordingFace};
    use crate::RosterConfig;
    use std::time::Duration;

    fn id(s: &str) -> RunnerId {
        RunnerId::new(s).unwrap()
    }

    fn message(name: &str, payload: &str) -> Data {
        Data::new(name.parse::<Name>().unwrap(), payload.as_bytes().to_vec())
    }

    fn setup<F: Face>(face: Arc<F>) -> (RosterManager<F>, MessageFetcher<F>) {
        let roster = RosterManager::new(Arc::clone(&face), RosterConfig::default());
        let board: SharedBoard = Arc::new(Mutex::new(Chalkboard::new()));
        let fetcher = MessageFetcher::new(face, FetchConfig::default(), roster.clone(), board);
        (roster, fetcher)
    }

    fn join(roster: &RosterManager<impl Face>, name: &str) -> RunnerTicket {
        let now = Timestamp::now();
        roster.announce(id(name), now, now);
        roster
            .tickets()
            .into_iter()
            .find(|t| t.id == id(name))
            .unwrap()
    }

    #[test]
    fn test_message_admitted_then_duplicate() {
        let (roster, fetcher) = setup(Arc::new(MemoryFace::new()));
        let ticket = join(&roster, "alice");
        let data = message("/messages/alice/1", "1700000000000%%hello");

        let (outcome, seq) = fetcher.on_message(&ticket, &data).unwrap();
        assert_eq!(outcome, FetchOutcome::Admitted);
        assert_eq!(seq.as_str(), "1");

        let (outcome, _) = fetcher.on_message(&ticket, &data).unwrap();
        assert_eq!(outcome, FetchOutcome::Duplicate);

        let board = fetcher.board().lock();
        assert_eq!(board.len(), 1);
        let entry = board.iter().next().unwrap();
        assert_eq!(entry.runner, id("alice"));
        assert_eq!(entry.sequence.as_str(), "1");
        assert_eq!(entry.origin, Timestamp::from_millis(1_700_000_000_000));
        assert_eq!(entry.text, "hello");
        assert!(!entry.is_posted());
    }

    #[test]
    fn test_malformed_is_excluded_not_admitted() {
        let (roster, fetcher) = setup(Arc::new(MemoryFace::new()));
        let ticket = join(&roster, "alice");

        let (outcome, seq) = fetcher
            .on_message(&ticket, &message("/messages/alice/7", "no marker here"))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Malformed);
        assert!(fetcher.board().lock().is_empty());
        assert!(roster
            .exclusion(&id("alice"))
            .unwrap()
            .contains(seq.as_component()));
        assert_eq!(fetcher.stats().malformed, 1);
    }

    #[test]
    fn test_late_response_for_expired_runner() {
        let (roster, fetcher) = setup(Arc::new(MemoryFace::new()));
        let ticket = join(&roster, "alice");

        roster.expire_at(Timestamp::now() + Duration::from_secs(120));
        let result = fetcher.on_message(&ticket, &message("/messages/alice/1", "1%%late"));

        assert_eq!(result, Err(FetchOutcome::Stale));
        assert!(fetcher.board().lock().is_empty());
    }

    #[tokio::test]
    async fn test_chain_for_departed_runner_issues_nothing() {
        let memory = MemoryFace::new();
        memory.insert(message("/messages/alice/1", "1%%x"));
        let face = Arc::new(RecordingFace::new(memory));
        let (roster, fetcher) = setup(Arc::clone(&face));
        let ticket = join(&roster, "alice");

        roster.expire_at(Timestamp::now() + Duration::from_secs(120));
        assert_eq!(fetcher.fetch_messages(ticket).await, 0);
        assert!(face
            .interests_for(&"/messages/alice".parse::<Name>().unwrap())
            .is_empty());
        assert_eq!(fetcher.stats().queries, 0);
    }

    #[test]
    fn test_response_for_other_runner_is_stale() {
        let (roster, fetcher) = setup(Arc::new(MemoryFace::new()));
        let ticket = join(&roster, "alice");
        let result = fetcher.on_message(&ticket, &message("/messages/bob/1", "1%%x"));
        assert_eq!(result, Err(FetchOutcome::Stale));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_drains_mailbox_with_growing_exclusion() {
        let memory = MemoryFace::new();
        for seq in 1..=12 {
            memory.insert(message(
                &format!("/messages/alice/{seq}"),
                &format!("{}%%msg {seq}", 1_700_000_000_000i64 + seq),
            ));
        }
        let face = Arc::new(RecordingFace::new(memory));
        let (roster, fetcher) = setup(Arc::clone(&face));
        let ticket = join(&roster, "alice");

        let processed = fetcher.fetch_messages(ticket).await;
        assert_eq!(processed, 12);
        assert_eq!(fetcher.board().lock().len(), 12);

        // query N+1 excludes every sequence returned by queries 1..N
        let interests = face.interests_for(&"/messages/alice".parse::<Name>().unwrap());
        assert_eq!(interests.len(), 13);
        for pair in interests.windows(2) {
            assert!(pair[0].exclude().is_subset(pair[1].exclude()));
            assert_eq!(pair[1].exclude().len(), pair[0].exclude().len() + 1);
        }
        assert_eq!(interests[12].exclude().len(), 12);

        // lowest-child selection drains in production order
        let texts: Vec<String> = fetcher.board().lock().drain().map(|e| e.text).collect();
        let expected: Vec<String> = (1..=12).map(|s| format!("msg {s}")).collect();
        assert_eq!(texts, expected);
        assert_eq!(roster.exclusion(&id("alice")).unwrap().len(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_chain_per_runner() {
        let (roster, fetcher) = setup(Arc::new(MemoryFace::new()));
        let ticket = join(&roster, "alice");

        let handle = fetcher.spawn_fetch(ticket.clone()).unwrap();
        assert!(fetcher.is_fetching(&ticket.id));
        assert!(fetcher.spawn_fetch(ticket.clone()).is_none());
        assert_eq!(fetcher.poll_all(vec![ticket.clone()]), 0);
        assert_eq!(fetcher.stats().skipped_busy, 1);

        assert_eq!(handle.await.unwrap(), 0);
        assert!(!fetcher.is_fetching(&ticket.id));
        assert!(fetcher.spawn_fetch(ticket).is_some());
    }
}
