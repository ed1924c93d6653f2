//! Synthetic query workload driving the registry the way an engine would.
//!
//! Each task runs on a blocking worker thread and processes its splits through
//! the configured operator chain, recording per-operator timings and row
//! counts into the task's live stats. Finished tasks are folded into the
//! query tracker.

use std::hint::black_box;
use std::sync::Arc;

use rtstats_core::error::{Result, StatsError};
use rtstats_core::{names, Clock, RuntimeStats, RuntimeUnit};

use crate::config::CollectorConfig;
use crate::query::QueryStatsTracker;

/// Bytes attributed to one input row read from storage.
const ROW_BYTES: i64 = 8;

/// Rows an operator emits for `input` rows.
fn output_rows(operator: &str, input: i64) -> i64 {
    match operator {
        "filter" => input / 2,
        "aggregate" => (input + 99) / 100,
        "limit" => input.min(10),
        _ => input,
    }
}

/// Touch every row so timed sections do real work on the calling thread.
fn process(operator: &str, input: i64) -> i64 {
    let mut acc = 0u64;
    for row in 0..input as u64 {
        acc = black_box(acc.wrapping_mul(31).wrapping_add(row));
    }
    black_box(acc);
    output_rows(operator, input)
}

struct TaskPlan {
    task_id: String,
    splits: u32,
    rows_per_split: i64,
    operators: Arc<Vec<String>>,
    cpu_timing: bool,
    /// Wall-clock reading when the task was handed to the worker pool.
    queued_at: u64,
}

fn timed<T>(stats: &RuntimeStats, cpu_timing: bool, tag: &str, work: impl FnOnce() -> T) -> T {
    if cpu_timing {
        stats.record_wall_and_cpu_time(tag, work)
    } else {
        stats.record_wall_time(tag, work)
    }
}

fn run_task(tracker: &QueryStatsTracker, plan: &TaskPlan) {
    let _span = tracing::debug_span!("task", task = %plan.task_id).entered();
    let Some(stats) = tracker.task(&plan.task_id) else {
        tracing::warn!(task = %plan.task_id, "task already completed; skipping");
        return;
    };
    let clock = stats.clock();
    let started_at = clock.wall_nanos();

    stats.add_metric_value_ignore_zero(
        names::TASK_QUEUED_TIME_NANOS,
        RuntimeUnit::Nano,
        elapsed_nanos(plan.queued_at, started_at),
    );
    stats.add_metric_value(
        names::DRIVER_COUNT_PER_TASK,
        RuntimeUnit::None,
        plan.operators.len() as i64,
    );

    timed(&stats, plan.cpu_timing, names::TASK_SCHEDULED_TIME_NANOS, || {
        for _ in 0..plan.splits {
            let mut rows = stats.record_wall_time(names::GET_SPLITS_TIME_NANOS, || {
                plan.rows_per_split
            });
            let bytes = stats.record_wall_time(names::STORAGE_READ_TIME_NANOS, || {
                process("read", rows) * ROW_BYTES
            });
            stats.add_metric_value(names::STORAGE_READ_DATA_BYTES, RuntimeUnit::Byte, bytes);

            for op in plan.operators.iter() {
                let input = rows;
                rows = timed(
                    &stats,
                    plan.cpu_timing,
                    &names::operator_metric(op, "wallNanos"),
                    || process(op, input),
                );
                stats.add_metric_value(
                    &names::operator_metric(op, "inputRows"),
                    RuntimeUnit::None,
                    input,
                );
                stats.add_metric_value_ignore_zero(
                    &names::operator_metric(op, "outputRows"),
                    RuntimeUnit::None,
                    rows,
                );
            }

            stats.add_metric_value(names::SPLITS_PROCESSED, RuntimeUnit::None, 1);
        }
    });

    stats.add_metric_value_ignore_zero(
        names::TASK_ELAPSED_TIME_NANOS,
        RuntimeUnit::Nano,
        elapsed_nanos(plan.queued_at, clock.wall_nanos()),
    );
    tracker.complete_task(&plan.task_id);
}

fn elapsed_nanos(from: u64, to: u64) -> i64 {
    i64::try_from(to.saturating_sub(from)).unwrap_or(i64::MAX)
}

/// Run the configured workload and return the query-level stats.
pub async fn run_workload(cfg: &CollectorConfig, clock: Arc<dyn Clock>) -> Result<RuntimeStats> {
    let w = &cfg.workload;
    let tracker = Arc::new(QueryStatsTracker::new(w.query_id.clone(), Arc::clone(&clock)));
    let operators = Arc::new(w.operators.clone());

    tracing::info!(
        query = %w.query_id,
        tasks = w.tasks,
        splits_per_task = w.splits_per_task,
        cpu_timing = cfg.collector.cpu_timing,
        "workload starting"
    );

    let mut handles = Vec::with_capacity(w.tasks);
    for i in 0..w.tasks {
        let plan = TaskPlan {
            task_id: format!("{}.{}", w.query_id, i),
            splits: w.splits_per_task,
            rows_per_split: i64::from(w.rows_per_split),
            operators: Arc::clone(&operators),
            cpu_timing: cfg.collector.cpu_timing,
            queued_at: clock.wall_nanos(),
        };
        let tracker = Arc::clone(&tracker);
        handles.push(tokio::task::spawn_blocking(move || run_task(&tracker, &plan)));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| StatsError::Internal(format!("task worker failed: {e}")))?;
    }

    tracing::info!(
        query = %w.query_id,
        completed = tracker.completed_tasks(),
        "workload finished"
    );
    Ok(tracker.query_stats())
}
