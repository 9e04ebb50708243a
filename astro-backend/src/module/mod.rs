//! Upstream data sources and the dashboard assembled from them.

pub mod census;
pub mod dashboard;
pub mod http;
pub mod links;
pub mod n2yo;
