//! Serialized view: a plain JSON object of name to metric.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rtstats_core::error::ErrorCode;
use rtstats_core::{RuntimeMetric, RuntimeStats, RuntimeUnit};

#[test]
fn serializes_as_name_keyed_object() {
    let stats = RuntimeStats::new();
    stats.add_metric_value("rows", RuntimeUnit::None, 15);

    let v: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
    assert_eq!(
        v,
        serde_json::json!({
            "rows": {"name":"rows","unit":"NONE","sum":15,"count":1,"max":15,"min":15}
        })
    );
}

#[test]
fn decode_replays_merge_metric() {
    let stats = RuntimeStats::new();
    stats.add_metric_value("t", RuntimeUnit::Nano, 10);
    stats.add_metric_value("t", RuntimeUnit::Nano, 20);
    stats.add_metric_value("b", RuntimeUnit::Byte, 4);

    let decoded = RuntimeStats::from_json(&stats.to_json().unwrap()).unwrap();
    assert_eq!(decoded, stats);

    let replayed = RuntimeStats::new();
    for (name, metric) in stats.snapshot() {
        replayed.merge_metric(&name, &metric);
    }
    assert_eq!(decoded, replayed);
}

#[test]
fn decode_uses_map_key_as_name() {
    let s = r#"{"scan": {"name":"other","unit":"BYTE","sum":8,"count":2,"max":6,"min":2}}"#;
    let stats = RuntimeStats::from_json(s).unwrap();
    let m = stats.get_metric("scan").unwrap();
    assert_eq!(*m, RuntimeMetric::with_values("scan", RuntimeUnit::Byte, 8, 2, 6, 2));
}

#[test]
fn empty_object_is_valid_null_is_not() {
    assert!(RuntimeStats::from_json("{}").unwrap().is_empty());

    let err = RuntimeStats::from_json("null").expect_err("must fail");
    assert_eq!(err.code().as_str(), ErrorCode::Codec.as_str());
}

#[test]
fn unknown_unit_is_rejected() {
    let s = r#"{"x": {"name":"x","unit":"MILLI","sum":1,"count":1,"max":1,"min":1}}"#;
    let err = RuntimeStats::from_json(s).expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Codec);
}
