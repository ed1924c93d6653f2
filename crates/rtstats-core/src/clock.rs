//! Timing sources for instrumented sections.
//!
//! The registry never reads clocks directly; it asks an injected [`Clock`].
//! Production code uses [`SystemClock`], tests drive a [`ManualClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Wall-clock and per-thread CPU-clock reader.
pub trait Clock: Send + Sync {
    /// Monotonic nanoseconds since an arbitrary fixed origin.
    fn wall_nanos(&self) -> u64;

    /// Cumulative CPU nanoseconds consumed by the calling thread.
    /// Returns 0 where the platform has no per-thread CPU clock.
    fn thread_cpu_nanos(&self) -> u64;
}

/// OS-backed clock. Per-thread CPU support is probed once at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
    thread_cpu_supported: bool,
}

impl SystemClock {
    pub fn new() -> Self {
        let thread_cpu_supported = read_thread_cpu_nanos().is_some();
        if !thread_cpu_supported {
            tracing::debug!("per-thread cpu clock unavailable; cpu timings will be zero");
        }
        Self {
            origin: Instant::now(),
            thread_cpu_supported,
        }
    }

    pub fn thread_cpu_supported(&self) -> bool {
        self.thread_cpu_supported
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn wall_nanos(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn thread_cpu_nanos(&self) -> u64 {
        if !self.thread_cpu_supported {
            return 0;
        }
        read_thread_cpu_nanos().unwrap_or(0)
    }
}

#[cfg(unix)]
fn read_thread_cpu_nanos() -> Option<u64> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, exclusively borrowed timespec for the duration
    // of the call; clock_gettime only writes into it.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return None;
    }
    let secs = u64::try_from(ts.tv_sec).ok()?;
    let nanos = u64::try_from(ts.tv_nsec).ok()?;
    Some(secs.saturating_mul(1_000_000_000).saturating_add(nanos))
}

#[cfg(not(unix))]
fn read_thread_cpu_nanos() -> Option<u64> {
    None
}

/// Deterministic clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    wall: AtomicU64,
    cpu: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_wall(&self, nanos: u64) {
        self.wall.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn advance_cpu(&self, nanos: u64) {
        self.cpu.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Advance both clocks, as a section that ran purely on-cpu would.
    pub fn advance(&self, nanos: u64) {
        self.advance_wall(nanos);
        self.advance_cpu(nanos);
    }
}

impl Clock for ManualClock {
    fn wall_nanos(&self) -> u64 {
        self.wall.load(Ordering::SeqCst)
    }

    fn thread_cpu_nanos(&self) -> u64 {
        self.cpu.load(Ordering::SeqCst)
    }
}
