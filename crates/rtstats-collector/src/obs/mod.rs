//! Report rendering for collected runtime stats.
//!
//! Stats are rendered from a snapshot, so rendering can run while workers
//! are still recording.

pub mod render;

pub use render::{render, render_summary};
