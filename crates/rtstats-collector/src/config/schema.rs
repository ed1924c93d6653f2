use std::collections::HashSet;

use serde::Deserialize;
use rtstats_core::error::{Result, StatsError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub version: u32,

    #[serde(default)]
    pub collector: CollectorSection,

    #[serde(default)]
    pub workload: WorkloadSection,
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StatsError::UnsupportedVersion);
        }
        self.collector.validate()?;
        self.workload.validate()?;
        Ok(())
    }
}

/// How the final query stats are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorSection {
    /// Record per-thread CPU time next to wall time for operator sections.
    #[serde(default = "default_cpu_timing")]
    pub cpu_timing: bool,

    #[serde(default)]
    pub report_format: ReportFormat,

    /// Metric name prefix for the text exposition.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl CollectorSection {
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.prefix.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StatsError::InvalidConfig(
                "collector.prefix must match [a-zA-Z_][a-zA-Z0-9_]*".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            cpu_timing: default_cpu_timing(),
            report_format: ReportFormat::default(),
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSection {
    #[serde(default = "default_query_id")]
    pub query_id: String,

    #[serde(default = "default_tasks")]
    pub tasks: usize,

    #[serde(default = "default_splits_per_task")]
    pub splits_per_task: u32,

    #[serde(default = "default_rows_per_split")]
    pub rows_per_split: u32,

    #[serde(default = "default_operators")]
    pub operators: Vec<String>,
}

impl Default for WorkloadSection {
    fn default() -> Self {
        Self {
            query_id: default_query_id(),
            tasks: default_tasks(),
            splits_per_task: default_splits_per_task(),
            rows_per_split: default_rows_per_split(),
            operators: default_operators(),
        }
    }
}

impl WorkloadSection {
    pub fn validate(&self) -> Result<()> {
        if self.query_id.trim().is_empty() {
            return Err(StatsError::InvalidConfig(
                "workload.query_id must not be empty".into(),
            ));
        }
        if !(1..=256).contains(&self.tasks) {
            return Err(StatsError::InvalidConfig(
                "workload.tasks must be between 1 and 256".into(),
            ));
        }
        if !(1..=100_000).contains(&self.splits_per_task) {
            return Err(StatsError::InvalidConfig(
                "workload.splits_per_task must be between 1 and 100000".into(),
            ));
        }
        if !(1..=10_000_000).contains(&self.rows_per_split) {
            return Err(StatsError::InvalidConfig(
                "workload.rows_per_split must be between 1 and 10000000".into(),
            ));
        }
        if self.operators.is_empty() {
            return Err(StatsError::InvalidConfig(
                "workload.operators must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for op in &self.operators {
            if op.is_empty() || op.contains('.') {
                return Err(StatsError::InvalidConfig(format!(
                    "workload.operators: invalid operator name {op:?}"
                )));
            }
            if !seen.insert(op.as_str()) {
                return Err(StatsError::InvalidConfig(format!(
                    "workload.operators: duplicate operator {op:?}"
                )));
            }
        }
        Ok(())
    }
}

fn default_cpu_timing() -> bool {
    true
}
fn default_prefix() -> String {
    "rtstats".into()
}
fn default_query_id() -> String {
    "query_1".into()
}
fn default_tasks() -> usize {
    4
}
fn default_splits_per_task() -> u32 {
    16
}
fn default_rows_per_split() -> u32 {
    1000
}
fn default_operators() -> Vec<String> {
    vec!["scan".into(), "filter".into(), "aggregate".into()]
}
