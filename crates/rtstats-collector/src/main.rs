//! rtstats collector
//!
//! Runs the configured synthetic workload against the runtime-stats registry
//! and prints the aggregated query stats.
//! - Config: first CLI argument, default `rtstats.yaml`
//! - Logging: `RUST_LOG` env filter

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use rtstats_collector::{config, report, workload};
use rtstats_core::SystemClock;

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "rtstats.yaml".to_string());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(path = %path, code = e.code().as_str(), error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let clock = Arc::new(SystemClock::new());
    if cfg.collector.cpu_timing && !clock.thread_cpu_supported() {
        tracing::warn!("cpu_timing enabled but per-thread cpu clock is unavailable");
    }

    let stats = match workload::run_workload(&cfg, clock).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "workload failed");
            return ExitCode::FAILURE;
        }
    };

    match report::render_report(&cfg, &stats) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "report failed");
            ExitCode::FAILURE
        }
    }
}
