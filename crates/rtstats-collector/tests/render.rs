#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rtstats_collector::obs;
use rtstats_core::{RuntimeMetric, RuntimeStats, RuntimeUnit};

#[test]
fn renders_sorted_series_per_aggregate() {
    let stats = RuntimeStats::new();
    stats.add_metric_value("rows", RuntimeUnit::None, 10);
    stats.add_metric_value("rows", RuntimeUnit::None, 5);
    stats.add_metric_value("bytes", RuntimeUnit::Byte, 64);

    let out = obs::render("rt", &stats);
    let expected = "\
# TYPE rt_sum counter
rt_sum{name=\"bytes\",unit=\"BYTE\"} 64
rt_sum{name=\"rows\",unit=\"NONE\"} 15
# TYPE rt_count counter
rt_count{name=\"bytes\",unit=\"BYTE\"} 1
rt_count{name=\"rows\",unit=\"NONE\"} 2
# TYPE rt_max gauge
rt_max{name=\"bytes\",unit=\"BYTE\"} 64
rt_max{name=\"rows\",unit=\"NONE\"} 10
# TYPE rt_min gauge
rt_min{name=\"bytes\",unit=\"BYTE\"} 64
rt_min{name=\"rows\",unit=\"NONE\"} 5
";
    assert_eq!(out, expected);
}

#[test]
fn empty_metric_skips_extremes() {
    let stats = RuntimeStats::new();
    stats.merge_metric("idle", &RuntimeMetric::new("idle", RuntimeUnit::Nano));

    let out = obs::render("rt", &stats);
    assert!(out.contains("rt_count{name=\"idle\",unit=\"NANO\"} 0"));
    assert!(!out.contains("rt_max{name=\"idle\""));
    assert!(!out.contains("rt_min{name=\"idle\""));
}

#[test]
fn label_values_are_escaped() {
    let stats = RuntimeStats::new();
    stats.add_metric_value("we\"ird\\name", RuntimeUnit::None, 1);
    let out = obs::render("rt", &stats);
    assert!(out.contains(r#"rt_sum{name="we\"ird\\name",unit="NONE"} 1"#));
}

#[test]
fn summary_has_one_line_per_metric() {
    let stats = RuntimeStats::new();
    stats.add_metric_value("a", RuntimeUnit::None, 4);
    stats.add_metric_value("a", RuntimeUnit::None, 2);
    stats.add_metric_value("b", RuntimeUnit::Nano, 9);

    let out = obs::render_summary(&stats);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("a "));
    assert!(lines[0].contains("sum=6 count=2 avg=3 max=4 min=2"));
    assert!(lines[1].contains("NANO"));
}
