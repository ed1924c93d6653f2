//! Single named metric accumulator.
//!
//! Each aggregate is its own atomic cell, so concurrent `add_value` calls from
//! many workers never block each other. A reader may observe the cells at
//! slightly different moments (e.g. `sum` already bumped, `count` not yet);
//! callers that need a stable view take a [`RuntimeMetric::copy`].

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use crate::unit::RuntimeUnit;

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetricRepr {
    name: String,
    unit: RuntimeUnit,
    sum: i64,
    count: i64,
    max: i64,
    min: i64,
}

/// Mergeable numeric measurement: running sum, count and extremes.
#[derive(Serialize, Deserialize)]
#[serde(from = "MetricRepr", into = "MetricRepr")]
pub struct RuntimeMetric {
    name: String,
    unit: RuntimeUnit,
    sum: AtomicI64,
    count: AtomicI64,
    max: AtomicI64,
    min: AtomicI64,
}

impl RuntimeMetric {
    pub fn new(name: impl Into<String>, unit: RuntimeUnit) -> Self {
        Self {
            name: name.into(),
            unit,
            sum: AtomicI64::new(0),
            count: AtomicI64::new(0),
            max: AtomicI64::new(i64::MIN),
            min: AtomicI64::new(i64::MAX),
        }
    }

    /// Build an accumulator with explicit aggregate values.
    pub fn with_values(
        name: impl Into<String>,
        unit: RuntimeUnit,
        sum: i64,
        count: i64,
        max: i64,
        min: i64,
    ) -> Self {
        Self {
            name: name.into(),
            unit,
            sum: AtomicI64::new(sum),
            count: AtomicI64::new(count),
            max: AtomicI64::new(max),
            min: AtomicI64::new(min),
        }
    }

    /// Fresh accumulator holding `a` merged with `b`. Inputs are untouched.
    pub fn merge(a: &RuntimeMetric, b: &RuntimeMetric) -> RuntimeMetric {
        let merged = a.copy();
        merged.merge_with(b);
        merged
    }

    /// Independent accumulator with the same name, unit and current values.
    pub fn copy(&self) -> RuntimeMetric {
        Self::with_values(
            self.name.clone(),
            self.unit,
            self.sum(),
            self.count(),
            self.max(),
            self.min(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> RuntimeUnit {
        self.unit
    }

    pub fn sum(&self) -> i64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn max(&self) -> i64 {
        self.max.load(Ordering::Relaxed)
    }

    pub fn min(&self) -> i64 {
        self.min.load(Ordering::Relaxed)
    }

    /// Mean of recorded values, 0 when nothing has been recorded.
    pub fn avg(&self) -> i64 {
        let count = self.count();
        if count == 0 {
            0
        } else {
            self.sum() / count
        }
    }

    /// Record one observation.
    pub fn add_value(&self, value: i64) {
        self.sum.fetch_add(value, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.max.fetch_max(value, Ordering::Relaxed);
        self.min.fetch_min(value, Ordering::Relaxed);
    }

    /// Fold `other`'s aggregates into this accumulator.
    pub fn merge_with(&self, other: &RuntimeMetric) {
        self.warn_on_unit_mismatch(other, "merge");
        self.sum.fetch_add(other.sum(), Ordering::Relaxed);
        self.count.fetch_add(other.count(), Ordering::Relaxed);
        self.max.fetch_max(other.max(), Ordering::Relaxed);
        self.min.fetch_min(other.min(), Ordering::Relaxed);
    }

    /// Overwrite all aggregates with `other`'s values.
    pub fn set(&self, other: &RuntimeMetric) {
        self.warn_on_unit_mismatch(other, "set");
        self.sum.store(other.sum(), Ordering::Relaxed);
        self.count.store(other.count(), Ordering::Relaxed);
        self.max.store(other.max(), Ordering::Relaxed);
        self.min.store(other.min(), Ordering::Relaxed);
    }

    fn warn_on_unit_mismatch(&self, other: &RuntimeMetric, op: &'static str) {
        if self.unit != other.unit {
            tracing::warn!(
                metric = %self.name,
                unit = %self.unit,
                incoming = %other.unit,
                op,
                "runtime metric unit mismatch"
            );
        }
    }
}

impl Clone for RuntimeMetric {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl PartialEq for RuntimeMetric {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.unit == other.unit
            && self.sum() == other.sum()
            && self.count() == other.count()
            && self.max() == other.max()
            && self.min() == other.min()
    }
}

impl fmt::Debug for RuntimeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeMetric")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("sum", &self.sum())
            .field("count", &self.count())
            .field("max", &self.max())
            .field("min", &self.min())
            .finish()
    }
}

impl From<MetricRepr> for RuntimeMetric {
    fn from(r: MetricRepr) -> Self {
        RuntimeMetric::with_values(r.name, r.unit, r.sum, r.count, r.max, r.min)
    }
}

impl From<RuntimeMetric> for MetricRepr {
    fn from(m: RuntimeMetric) -> Self {
        MetricRepr {
            sum: m.sum(),
            count: m.count(),
            max: m.max(),
            min: m.min(),
            unit: m.unit,
            name: m.name,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn add_value_tracks_extremes() {
        let m = RuntimeMetric::new("rows", RuntimeUnit::None);
        m.add_value(7);
        m.add_value(-2);
        m.add_value(11);
        assert_eq!(m.sum(), 16);
        assert_eq!(m.count(), 3);
        assert_eq!(m.max(), 11);
        assert_eq!(m.min(), -2);
        assert_eq!(m.avg(), 5);
    }

    #[test]
    fn empty_metric_has_sentinel_extremes() {
        let m = RuntimeMetric::new("x", RuntimeUnit::Byte);
        assert_eq!(m.count(), 0);
        assert_eq!(m.avg(), 0);
        assert_eq!(m.max(), i64::MIN);
        assert_eq!(m.min(), i64::MAX);
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let a = RuntimeMetric::new("t", RuntimeUnit::Nano);
        a.add_value(10);
        let b = RuntimeMetric::new("t", RuntimeUnit::Nano);
        b.add_value(30);
        b.add_value(2);

        let m = RuntimeMetric::merge(&a, &b);
        assert_eq!((m.sum(), m.count(), m.max(), m.min()), (42, 3, 30, 2));
        assert_eq!((a.sum(), a.count()), (10, 1));
        assert_eq!((b.sum(), b.count()), (32, 2));
    }

    #[test]
    fn set_overwrites_everything() {
        let a = RuntimeMetric::new("t", RuntimeUnit::Nano);
        a.add_value(100);
        let b = RuntimeMetric::with_values("t", RuntimeUnit::Nano, 5, 1, 5, 5);
        a.set(&b);
        assert_eq!(a, b);
    }

    #[test]
    fn serde_shape() {
        let m = RuntimeMetric::with_values("bytes", RuntimeUnit::Byte, 9, 2, 8, 1);
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"name":"bytes","unit":"BYTE","sum":9,"count":2,"max":8,"min":1})
        );
        let back: RuntimeMetric = serde_json::from_value(v).unwrap();
        assert_eq!(back, m);
    }
}
