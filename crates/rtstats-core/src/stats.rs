//! Concurrent registry of named runtime metrics.
//!
//! `RuntimeStats` is shared by every worker of one execution scope (operator,
//! task, query). Writers look up or create the accumulator for a name and
//! then mutate it without holding any map lock:
//!
//! - lookup is a read on the owning `DashMap` shard, with no key allocation;
//! - on a miss, `entry().or_insert_with()` installs exactly one accumulator
//!   under the shard's write lock, so racing first-writers converge on it;
//! - the `Arc` is cloned out and the shard guard released before the
//!   accumulator's own (atomic) mutation runs.
//!
//! Snapshots are weakly consistent across keys. Every accumulator is fully
//! built before it is inserted, so readers never see a partial one.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::metric::RuntimeMetric;
use crate::names;
use crate::unit::RuntimeUnit;

/// Process-wide system clock, probed once and reused by every registry that
/// is not given its own clock.
fn default_clock() -> Arc<dyn Clock> {
    static CLOCK: OnceLock<Arc<SystemClock>> = OnceLock::new();
    let clock = CLOCK.get_or_init(|| Arc::new(SystemClock::new()));
    Arc::clone(clock) as Arc<dyn Clock>
}

fn nanos(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Metrics exposed by operators or connectors, aggregated up to query level.
pub struct RuntimeStats {
    metrics: DashMap<String, Arc<RuntimeMetric>>,
    clock: Arc<dyn Clock>,
}

impl RuntimeStats {
    pub fn new() -> Self {
        Self::with_clock(default_clock())
    }

    /// Empty registry timing sections with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            metrics: DashMap::new(),
            clock,
        }
    }

    /// Build a registry by merging every `(name, metric)` entry into a fresh,
    /// independent accumulator, exactly as repeated `merge_metric` would.
    pub fn from_snapshot<I, K, M>(snapshot: I) -> Self
    where
        I: IntoIterator<Item = (K, M)>,
        K: AsRef<str>,
        M: Borrow<RuntimeMetric>,
    {
        Self::from_snapshot_with_clock(snapshot, default_clock())
    }

    pub fn from_snapshot_with_clock<I, K, M>(snapshot: I, clock: Arc<dyn Clock>) -> Self
    where
        I: IntoIterator<Item = (K, M)>,
        K: AsRef<str>,
        M: Borrow<RuntimeMetric>,
    {
        let stats = Self::with_clock(clock);
        for (name, metric) in snapshot {
            stats.merge_metric(name.as_ref(), metric.borrow());
        }
        stats
    }

    /// Deep copy sharing no mutable state with `stats`.
    pub fn copy_of(stats: &RuntimeStats) -> Self {
        Self::from_snapshot_with_clock(stats.snapshot(), Arc::clone(&stats.clock))
    }

    /// Merge two optional registries into a new one. Inputs are not updated.
    pub fn merge(a: Option<&RuntimeStats>, b: Option<&RuntimeStats>) -> Option<RuntimeStats> {
        match (a, b) {
            (None, None) => None,
            (Some(a), None) => Some(Self::copy_of(a)),
            (None, Some(b)) => Some(Self::copy_of(b)),
            (Some(a), Some(b)) => {
                let merged = Self::copy_of(a);
                merged.merge_with(Some(b));
                Some(merged)
            }
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Point-in-time view of the current name to accumulator mapping.
    ///
    /// The accumulators are the live ones; use [`RuntimeStats::copy_of`] for
    /// values that stop changing.
    pub fn snapshot(&self) -> BTreeMap<String, Arc<RuntimeMetric>> {
        self.metrics
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect()
    }

    /// Alias of [`RuntimeStats::snapshot`]; this is the serialized view.
    pub fn metrics(&self) -> BTreeMap<String, Arc<RuntimeMetric>> {
        self.snapshot()
    }

    pub fn reset(&self) {
        self.metrics.clear();
        tracing::debug!("runtime stats reset");
    }

    pub fn get_metric(&self, name: &str) -> Option<Arc<RuntimeMetric>> {
        self.metrics.get(name).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Get-or-create. The returned `Arc` is detached from the shard guard.
    fn metric_for(&self, name: &str, unit: RuntimeUnit) -> Arc<RuntimeMetric> {
        if let Some(existing) = self.metrics.get(name) {
            return Arc::clone(existing.value());
        }
        let entry = self.metrics.entry(name.to_string()).or_insert_with(|| {
            tracing::trace!(metric = name, %unit, "new runtime metric");
            Arc::new(RuntimeMetric::new(name, unit))
        });
        Arc::clone(entry.value())
    }

    pub fn add_metric_value(&self, name: &str, unit: RuntimeUnit, value: i64) {
        self.metric_for(name, unit).add_value(value);
    }

    /// Like [`RuntimeStats::add_metric_value`], but a zero value creates nothing.
    pub fn add_metric_value_ignore_zero(&self, name: &str, unit: RuntimeUnit, value: i64) {
        if value == 0 {
            return;
        }
        self.add_metric_value(name, unit, value);
    }

    /// Merge `metric` into the accumulator named `name`.
    pub fn merge_metric(&self, name: &str, metric: &RuntimeMetric) {
        self.metric_for(name, metric.unit()).merge_with(metric);
    }

    /// Merge `other` into this registry. Existing values are combined, never
    /// overwritten; `None` is a no-op.
    pub fn merge_with(&self, other: Option<&RuntimeStats>) {
        let Some(other) = other else { return };
        // Collect first so merging a registry into itself cannot hold a shard
        // read guard while a write to the same shard is attempted.
        for (name, metric) in other.snapshot() {
            self.merge_metric(&name, &metric);
        }
    }

    /// Refresh the metrics named in `other` to `other`'s values.
    /// Metrics not included in `other` are not changed; `None` is a no-op.
    pub fn update(&self, other: Option<&RuntimeStats>) {
        let Some(other) = other else { return };
        for (name, metric) in other.snapshot() {
            self.metric_for(&name, metric.unit()).set(&metric);
        }
    }

    /// Run `work`, recording its wall time under `tag` (nanoseconds, zero
    /// suppressed). Returns `work`'s result unchanged.
    pub fn record_wall_time<T>(&self, tag: &str, work: impl FnOnce() -> T) -> T {
        let start = self.clock.wall_nanos();
        let result = work();
        let elapsed = self.clock.wall_nanos().saturating_sub(start);
        self.add_metric_value_ignore_zero(tag, RuntimeUnit::Nano, nanos(elapsed));
        result
    }

    /// Like [`RuntimeStats::record_wall_time`], additionally recording the
    /// calling thread's CPU time under `tag` + `"OnCpu"`.
    ///
    /// CPU consumed by other threads that `work` hands off to is not counted.
    pub fn record_wall_and_cpu_time<T>(&self, tag: &str, work: impl FnOnce() -> T) -> T {
        let start_wall = self.clock.wall_nanos();
        let start_cpu = self.clock.thread_cpu_nanos();

        let result = work();

        let end_wall = self.clock.wall_nanos();
        let end_cpu = self.clock.thread_cpu_nanos();

        self.add_metric_value_ignore_zero(
            tag,
            RuntimeUnit::Nano,
            nanos(end_wall.saturating_sub(start_wall)),
        );
        self.add_metric_value_ignore_zero(
            &names::on_cpu(tag),
            RuntimeUnit::Nano,
            nanos(end_cpu.saturating_sub(start_cpu)),
        );
        result
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Default for RuntimeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RuntimeStats {
    fn clone(&self) -> Self {
        Self::copy_of(self)
    }
}

/// Equal when both hold the same names with equal metric values.
impl PartialEq for RuntimeStats {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl fmt::Debug for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}

impl Serialize for RuntimeStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let snapshot = self.snapshot();
        serializer.collect_map(snapshot.iter().map(|(name, metric)| (name, metric.as_ref())))
    }
}

impl<'de> Deserialize<'de> for RuntimeStats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let metrics = BTreeMap::<String, RuntimeMetric>::deserialize(deserializer)?;
        Ok(RuntimeStats::from_snapshot(metrics))
    }
}
