//! Data-acquisition side of AstroDashboard.
//!
//! Holds the N2YO credential, proxies single-satellite position lookups, and
//! assembles the page-load state (initial positions plus the astronaut census).

pub mod config;
pub mod error;
pub mod module;
pub mod server;
