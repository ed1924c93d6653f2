//! Final report for a finished query.

use serde::Serialize;

use rtstats_core::error::Result;
use rtstats_core::RuntimeStats;

use crate::config::{CollectorConfig, ReportFormat};
use crate::obs;

#[derive(Serialize)]
struct JsonReport<'a> {
    query_id: &'a str,
    metrics: &'a RuntimeStats,
}

/// Render `stats` in the configured report format.
pub fn render_report(cfg: &CollectorConfig, stats: &RuntimeStats) -> Result<String> {
    match cfg.collector.report_format {
        ReportFormat::Text => {
            let mut out = obs::render_summary(stats);
            out.push('\n');
            out.push_str(&obs::render(&cfg.collector.prefix, stats));
            Ok(out)
        }
        ReportFormat::Json => {
            let body = JsonReport {
                query_id: &cfg.workload.query_id,
                metrics: stats,
            };
            Ok(serde_json::to_string_pretty(&body)?)
        }
    }
}
