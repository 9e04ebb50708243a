//! Wire types and process plumbing shared by the AstroDashboard backend and
//! the position tracker.

pub mod logging;
pub mod types;

pub use types::*;
