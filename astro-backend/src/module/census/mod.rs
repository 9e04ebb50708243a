//! Open Notify astronaut census
//!
//! Who is in space right now, and aboard which craft.

pub mod client;
pub mod parser;
pub mod types;

pub use client::{CensusProvider, OpenNotifyClient};
pub use types::{Astronaut, Census};
