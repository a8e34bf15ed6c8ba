//! BigBoard Runtime - wiring and scheduling
//!
//! This crate turns the roster, fetcher and chalkboard into a running
//! client:
//! - Configuration (`BoardConfig`)
//! - The beacon: periodic fetch and post ticks
//! - Output collaborators (`Emit`)
//! - Logging setup and runtime statistics

pub mod beacon;
pub mod client;
pub mod config;
pub mod logging;
pub mod output;
pub mod stats;

pub use beacon::*;
pub use client::*;
pub use config::*;
pub use logging::*;
pub use output::*;
pub use stats::*;
