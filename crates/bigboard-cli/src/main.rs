//! BigBoard CLI
//!
//! Runs a client against an in-process simulated network and prints the
//! board to stdout. Logs go to stderr.

mod sim;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use bigboard_core::BoardResult;
use bigboard_runtime::{
    init_logging, BoardConfig, Client, LogFormat, StdoutEmitter, DEFAULT_LOG_FILTER,
};
use bigboard_transport::MemoryFace;

use crate::sim::SimConfig;

#[derive(Parser, Debug)]
#[command(name = "bigboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Namespace runners announce themselves under
    #[arg(long, default_value = "/users")]
    users_prefix: String,

    /// Namespace holding per-runner mailboxes
    #[arg(long, default_value = "/messages")]
    messages_prefix: String,

    /// Drop runners silent for longer than this
    #[arg(long, value_parser = humantime::parse_duration, default_value = "60s")]
    expiry_window: Duration,

    /// Lifetime of a discovery interest
    #[arg(long, value_parser = humantime::parse_duration, default_value = "5s")]
    discovery_lifetime: Duration,

    /// Lifetime of a message interest
    #[arg(long, value_parser = humantime::parse_duration, default_value = "500ms")]
    fetch_lifetime: Duration,

    /// Fetch tick period
    #[arg(long, value_parser = humantime::parse_duration, default_value = "500ms")]
    beacon_interval: Duration,

    /// Post tick period
    #[arg(long, value_parser = humantime::parse_duration, default_value = "500ms")]
    post_interval: Duration,

    /// Fingerprints remembered for duplicate suppression
    #[arg(long, default_value_t = 65_536)]
    fingerprint_capacity: usize,

    /// Number of simulated runners
    #[arg(long, default_value_t = 3)]
    runners: usize,

    /// Average time between messages from one simulated runner
    #[arg(long, value_parser = humantime::parse_duration, default_value = "2s")]
    message_interval: Duration,

    /// Stop after this long (runs until Ctrl-C otherwise)
    #[arg(long, value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Log format (pretty, json)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

impl Args {
    fn board_config(&self) -> BoardResult<BoardConfig> {
        let config = BoardConfig::default()
            .with_users_prefix(&self.users_prefix)?
            .with_messages_prefix(&self.messages_prefix)?
            .with_expiry_window(self.expiry_window)
            .with_discovery_lifetime(self.discovery_lifetime)
            .with_fetch_lifetime(self.fetch_lifetime)
            .with_beacon_interval(self.beacon_interval)
            .with_post_interval(self.post_interval)
            .with_fingerprint_capacity(self.fingerprint_capacity);
        config.validate()?;
        Ok(config)
    }

    fn sim_config(&self, board: &BoardConfig) -> SimConfig {
        SimConfig {
            runners: self.runners,
            message_interval: self.message_interval,
            users_prefix: board.users_prefix.clone(),
            messages_prefix: board.messages_prefix.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_format, DEFAULT_LOG_FILTER).context("failed to initialise logging")?;
    let config = args.board_config().context("invalid configuration")?;

    let face = MemoryFace::new();
    let producers = sim::spawn_network(&face, &args.sim_config(&config))
        .context("failed to start simulated network")?;
    info!(runners = producers.len(), "simulated network started");

    let client = Client::new(Arc::new(face.clone()), config).context("failed to start client")?;

    let (tx, shutdown) = watch::channel(false);
    let limit = args.duration;
    tokio::spawn(async move {
        wait_for_shutdown(limit).await;
        let _ = tx.send(true);
    });

    client.run(StdoutEmitter, shutdown).await;

    for producer in producers {
        producer.abort();
    }
    face.close();

    let stats = client.stats();
    info!(
        runners = stats.runners,
        joined = stats.roster.joined,
        refreshed = stats.roster.refreshed,
        expired = stats.roster.expired,
        sweeps = stats.roster.sweeps,
        queries = stats.fetch.queries,
        timeouts = stats.fetch.timeouts,
        admitted = stats.fetch.admitted,
        duplicates = stats.fetch.duplicates,
        malformed = stats.fetch.malformed,
        posted = stats.posted,
        "bigboard finished"
    );

    Ok(())
}

async fn wait_for_shutdown(limit: Option<Duration>) {
    match limit {
        Some(limit) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("interrupted"),
                _ = tokio::time::sleep(limit) => info!("run limit reached"),
            }
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("interrupted");
        }
    }
}
