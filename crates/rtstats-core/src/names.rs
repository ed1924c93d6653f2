//! Well-known runtime metric names shared by the engine's layers.

/// Suffix appended to a timing tag for the CPU-time companion metric.
pub const ON_CPU_SUFFIX: &str = "OnCpu";

pub const DRIVER_COUNT_PER_TASK: &str = "driverCountPerTask";
pub const TASK_ELAPSED_TIME_NANOS: &str = "taskElapsedTimeNanos";
pub const TASK_QUEUED_TIME_NANOS: &str = "taskQueuedTimeNanos";
pub const TASK_SCHEDULED_TIME_NANOS: &str = "taskScheduledTimeNanos";
pub const GET_SPLITS_TIME_NANOS: &str = "getSplitsTimeNanos";
pub const SPLITS_PROCESSED: &str = "splitsProcessed";
pub const STORAGE_READ_TIME_NANOS: &str = "storageReadTimeNanos";
pub const STORAGE_READ_DATA_BYTES: &str = "storageReadDataBytes";

/// Name of the CPU-time companion of `tag`.
pub fn on_cpu(tag: &str) -> String {
    format!("{tag}{ON_CPU_SUFFIX}")
}

/// Operator-scoped metric name, e.g. `scan.inputRows`.
pub fn operator_metric(operator: &str, metric: &str) -> String {
    format!("{operator}.{metric}")
}
