//! Text exposition of a `RuntimeStats` snapshot.
//!
//! One family per aggregate (`_sum`, `_count`, `_max`, `_min`), one series per
//! metric labelled with its `name` and `unit`. Series are sorted by metric
//! name to keep output deterministic. Extremes of a metric that never saw a
//! value are sentinels, so those series are skipped.

use std::fmt::Write;

use rtstats_core::{RuntimeMetric, RuntimeStats};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn labels(m: &RuntimeMetric, key: &str) -> String {
    format!("name=\"{}\",unit=\"{}\"", escape_label(key), m.unit())
}

/// Render in Prometheus text exposition format.
pub fn render(prefix: &str, stats: &RuntimeStats) -> String {
    // Freeze values once so all families agree with each other.
    let frozen: Vec<(String, RuntimeMetric)> = stats
        .snapshot()
        .into_iter()
        .map(|(k, m)| (k, m.copy()))
        .collect();

    let mut out = String::new();

    let _ = writeln!(out, "# TYPE {prefix}_sum counter");
    for (k, m) in &frozen {
        let _ = writeln!(out, "{prefix}_sum{{{}}} {}", labels(m, k), m.sum());
    }

    let _ = writeln!(out, "# TYPE {prefix}_count counter");
    for (k, m) in &frozen {
        let _ = writeln!(out, "{prefix}_count{{{}}} {}", labels(m, k), m.count());
    }

    let _ = writeln!(out, "# TYPE {prefix}_max gauge");
    for (k, m) in frozen.iter().filter(|(_, m)| m.count() > 0) {
        let _ = writeln!(out, "{prefix}_max{{{}}} {}", labels(m, k), m.max());
    }

    let _ = writeln!(out, "# TYPE {prefix}_min gauge");
    for (k, m) in frozen.iter().filter(|(_, m)| m.count() > 0) {
        let _ = writeln!(out, "{prefix}_min{{{}}} {}", labels(m, k), m.min());
    }

    out
}

/// Human-oriented summary table, one line per metric.
pub fn render_summary(stats: &RuntimeStats) -> String {
    let mut out = String::new();
    for (name, m) in stats.snapshot() {
        let m = m.copy();
        let _ = writeln!(
            out,
            "{name:<32} {:>5} sum={} count={} avg={} max={} min={}",
            m.unit().as_str(),
            m.sum(),
            m.count(),
            m.avg(),
            if m.count() > 0 { m.max() } else { 0 },
            if m.count() > 0 { m.min() } else { 0 },
        );
    }
    out
}
