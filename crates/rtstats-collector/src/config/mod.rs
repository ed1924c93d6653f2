//! Collector config loader (strict parsing).

pub mod schema;

use std::fs;

use rtstats_core::error::{Result, StatsError};

pub use schema::{CollectorConfig, CollectorSection, ReportFormat, WorkloadSection};

pub fn load_from_file(path: &str) -> Result<CollectorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| StatsError::InvalidConfig(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<CollectorConfig> {
    let cfg: CollectorConfig = serde_yaml::from_str(s)
        .map_err(|e| StatsError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
