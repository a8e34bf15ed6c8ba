//! BigBoard Transport Layer - the client's view of the network substrate
//!
//! This crate provides:
//! - Interest and Data packets (named query and named answer)
//! - The `Face` trait through which interests are expressed
//! - `MemoryFace`, an in-process loopback substrate
//! - `RecordingFace`, a wrapper that logs every interest it forwards

pub mod face;
pub mod memory;
pub mod packet;
pub mod recording;

pub use face::*;
pub use memory::MemoryFace;
pub use packet::*;
pub use recording::RecordingFace;
