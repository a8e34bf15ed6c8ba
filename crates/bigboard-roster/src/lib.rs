//! BigBoard Roster - who is out there, and what have they said
//!
//! This crate implements the two enumeration chains of the client:
//! - Roster discovery: highest-child queries under the users prefix,
//!   excluding every id already seen, plus liveness expiry
//! - Message fetching: lowest-child queries under `messages/<runner>`,
//!   excluding every sequence already retrieved, feeding the chalkboard

pub mod config;
pub mod fetcher;
pub mod manager;
pub mod roster;
pub mod runner;

pub use config::*;
pub use fetcher::*;
pub use manager::*;
pub use roster::*;
pub use runner::*;
