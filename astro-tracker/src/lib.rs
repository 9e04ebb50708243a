//! Live satellite tracking: per-tick position polling, a single map marker
//! and the toggle-driven timer behind it.

pub mod backend;
pub mod config;
pub mod console;
pub mod error;
pub mod fetcher;
pub mod map;
pub mod model;
pub mod scheduler;
pub mod selection;
pub mod store;
pub mod tracker;
