//! rtstats core: the runtime-metrics registry and its collaborators.
//!
//! This crate defines the metric accumulator, measurement units, timing
//! sources, and the concurrent `RuntimeStats` registry that operators and
//! connectors record into during query execution. It carries no runtime or
//! transport dependencies so it can be embedded in any execution layer.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Registry operations are total; the only fallible paths (decoding) surface
//! as `StatsError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod metric;
pub mod names;
pub mod stats;
pub mod unit;

/// Shared result type.
pub use error::{Result, StatsError};

pub use clock::{Clock, ManualClock, SystemClock};
pub use metric::RuntimeMetric;
pub use stats::RuntimeStats;
pub use unit::RuntimeUnit;
