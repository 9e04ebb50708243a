//! N2YO satellite tracking API
//!
//! Fetches the current sub-satellite point of one NORAD id through the
//! `positions` endpoint (observer at 0/0/0, one second of data).

pub mod client;
pub mod parser;
pub mod types;

pub use client::{N2yoClient, PositionProvider};
pub use types::SatellitePosition;
