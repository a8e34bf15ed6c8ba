//! Simulated network
//!
//! Stands in for real producers: each simulated runner keeps a liveness
//! announcement under the users prefix and publishes messages into its
//! mailbox on the shared in-memory face.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinHandle;

use bigboard_board::encode_payload;
use bigboard_core::{BoardResult, Name, Timestamp};
use bigboard_transport::{Data, MemoryFace};

/// How long an announcement satisfies a fresh-only interest
const ANNOUNCE_FRESHNESS: Duration = Duration::from_secs(10);

const RUNNER_NAMES: &[&str] = &[
    "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi",
];

const PHRASES: &[&str] = &[
    "hello",
    "anyone around?",
    "lunch at noon",
    "build is green",
    "pushing a fix",
    "back in five",
    "%% markers are fine in text",
];

/// Simulated network parameters
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub runners: usize,
    /// Mean time between messages from one runner
    pub message_interval: Duration,
    pub users_prefix: Name,
    pub messages_prefix: Name,
}

/// Id of the `index`-th simulated runner
pub fn runner_name(index: usize) -> String {
    match RUNNER_NAMES.get(index) {
        Some(name) => (*name).to_string(),
        None => format!("runner{index}"),
    }
}

/// Start one producer task per simulated runner
pub fn spawn_network(face: &MemoryFace, config: &SimConfig) -> BoardResult<Vec<JoinHandle<()>>> {
    let mut producers = Vec::with_capacity(config.runners);

    for index in 0..config.runners {
        let producer = Producer::new(face.clone(), config, &runner_name(index))?;
        producers.push(tokio::spawn(producer.run()));
    }
    Ok(producers)
}

struct Producer {
    face: MemoryFace,
    id: String,
    announcements: Name,
    mailbox: Name,
    interval: Duration,
    next_seq: u64,
}

impl Producer {
    fn new(face: MemoryFace, config: &SimConfig, id: &str) -> BoardResult<Self> {
        Ok(Producer {
            face,
            id: id.to_string(),
            announcements: config.users_prefix.clone().append_str(id)?,
            mailbox: config.messages_prefix.clone().append_str(id)?,
            interval: config.message_interval,
            next_seq: 1,
        })
    }

    async fn run(mut self) {
        loop {
            if let Err(e) = self.step() {
                tracing::warn!(runner = %self.id, "producer stopped: {}", e);
                return;
            }
            tokio::time::sleep(self.jittered_interval()).await;
        }
    }

    fn step(&mut self) -> BoardResult<()> {
        self.announce()?;
        self.publish()
    }

    /// Replace the runner's announcement with one stamped now
    fn announce(&self) -> BoardResult<()> {
        let name = self
            .announcements
            .clone()
            .append_str(&Timestamp::now().as_millis().to_string())?;
        self.face.remove_prefix(&self.announcements);
        self.face
            .insert(Data::new(name, Vec::new()).with_freshness(ANNOUNCE_FRESHNESS));
        Ok(())
    }

    fn publish(&mut self) -> BoardResult<()> {
        let name = self.mailbox.clone().append_str(&self.next_seq.to_string())?;
        let text = PHRASES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("hello");

        self.face
            .insert(Data::new(name, encode_payload(Timestamp::now(), text)));
        tracing::debug!(runner = %self.id, seq = self.next_seq, "simulated message");
        self.next_seq += 1;
        Ok(())
    }

    /// Somewhere between half and one and a half times the interval
    fn jittered_interval(&self) -> Duration {
        let base = self.interval.as_millis().max(2) as u64;
        let jitter = rand::thread_rng().gen_range(0..=base);
        Duration::from_millis(base / 2 + jitter)
    }
}
