//! Top-level facade crate for rtstats.
//!
//! Re-exports the registry core and the collector library so users can depend on a single crate.

pub mod core {
    pub use rtstats_core::*;
}

pub mod collector {
    pub use rtstats_collector::*;
}
