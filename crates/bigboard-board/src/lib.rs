//! BigBoard Board - the deduplicating, time-ordered message queue
//!
//! This crate implements everything between a fetched payload and a
//! printed line:
//! - Payload decoding (`<origin-ms>%%<text>`)
//! - Content fingerprints and the bounded fingerprint cache
//! - Board entries and their display format
//! - The chalkboard: ordered storage with single-delivery drain

pub mod chalkboard;
pub mod codec;
pub mod entry;
pub mod fingerprint;

pub use chalkboard::*;
pub use codec::*;
pub use entry::*;
pub use fingerprint::*;
