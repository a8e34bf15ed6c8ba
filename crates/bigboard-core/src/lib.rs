//! BigBoard Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every BigBoard component:
//! - Identifiers (RunnerId, Sequence)
//! - Wall-clock timestamps (Timestamp)
//! - Hierarchical names and name components (Name, Component)
//! - Exclusion filters used for enumeration queries (Exclude)
//! - The error type (BoardError)

pub mod error;
pub mod exclude;
pub mod id;
pub mod name;
pub mod time;

pub use error::*;
pub use exclude::*;
pub use id::*;
pub use name::*;
pub use time::*;
