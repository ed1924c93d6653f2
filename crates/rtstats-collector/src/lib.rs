//! rtstats collector library entry.
//!
//! This crate wires the registry core into a query-level aggregation stack:
//! config loading, per-task tracking, report rendering, and a synthetic
//! workload runner. It is consumed by the binary (`main.rs`) and by
//! integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod obs;
pub mod query;
pub mod report;
pub mod workload;

pub use query::QueryStatsTracker;
