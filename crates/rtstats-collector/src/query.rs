//! Query-level aggregation of per-task runtime stats.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rtstats_core::{Clock, RuntimeStats};

/// Lifecycle of one task id. A completed id never runs again.
enum TaskSlot {
    Running(Arc<RuntimeStats>),
    Completed,
}

/// Tracks the live stats of running tasks and the folded stats of finished ones.
///
/// - `task_id -> Running(RuntimeStats)` while workers record in place
/// - `task_id -> Completed` once folded into the accumulated stats
///
/// Both transitions happen under the id's shard lock, so a late report for a
/// finished task cannot re-create it.
pub struct QueryStatsTracker {
    query_id: String,
    clock: Arc<dyn Clock>,
    tasks: DashMap<String, TaskSlot>,
    completed: RuntimeStats,
    completed_tasks: AtomicUsize,
}

impl QueryStatsTracker {
    pub fn new(query_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            query_id: query_id.into(),
            completed: RuntimeStats::with_clock(Arc::clone(&clock)),
            clock,
            tasks: DashMap::new(),
            completed_tasks: AtomicUsize::new(0),
        }
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Live registry of a running task, created on first use.
    /// Returns `None` once the task has completed.
    pub fn task(&self, task_id: &str) -> Option<Arc<RuntimeStats>> {
        if let Some(slot) = self.tasks.get(task_id) {
            return match slot.value() {
                TaskSlot::Running(stats) => Some(Arc::clone(stats)),
                TaskSlot::Completed => None,
            };
        }
        match self.tasks.entry(task_id.to_string()) {
            Entry::Occupied(e) => match e.get() {
                TaskSlot::Running(stats) => Some(Arc::clone(stats)),
                TaskSlot::Completed => None,
            },
            Entry::Vacant(e) => {
                tracing::debug!(query = %self.query_id, task = task_id, "task stats created");
                let stats = Arc::new(RuntimeStats::with_clock(Arc::clone(&self.clock)));
                e.insert(TaskSlot::Running(Arc::clone(&stats)));
                Some(stats)
            }
        }
    }

    /// Apply a status report carrying the latest cumulative values of a task.
    /// Reports for completed tasks are dropped; returns whether it was applied.
    pub fn refresh_task(&self, task_id: &str, latest: &RuntimeStats) -> bool {
        match self.task(task_id) {
            Some(stats) => {
                stats.update(Some(latest));
                true
            }
            None => {
                tracing::debug!(
                    query = %self.query_id,
                    task = task_id,
                    "dropping status report for completed task"
                );
                false
            }
        }
    }

    /// Fold a running task into the completed stats. Returns `false` when the
    /// task is unknown or already completed.
    ///
    /// Writes made afterwards through an `Arc<RuntimeStats>` obtained from
    /// [`QueryStatsTracker::task`] land in the detached registry and are lost.
    pub fn complete_task(&self, task_id: &str) -> bool {
        let stats = {
            let Some(mut slot) = self.tasks.get_mut(task_id) else {
                return false;
            };
            match std::mem::replace(slot.value_mut(), TaskSlot::Completed) {
                TaskSlot::Running(stats) => stats,
                TaskSlot::Completed => return false,
            }
        };
        self.completed.merge_with(Some(stats.as_ref()));
        let done = self.completed_tasks.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            query = %self.query_id,
            task = task_id,
            metrics = stats.len(),
            completed = done,
            "task stats completed"
        );
        true
    }

    pub fn running_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|e| matches!(e.value(), TaskSlot::Running(_)))
            .count()
    }

    pub fn completed_tasks(&self) -> usize {
        self.completed_tasks.load(Ordering::Relaxed)
    }

    /// Query-wide stats: completed tasks plus the current state of running ones.
    ///
    /// A task completing concurrently with this call may be missed, never
    /// counted twice: completed stats are copied before running tasks are read.
    pub fn query_stats(&self) -> RuntimeStats {
        let stats = RuntimeStats::copy_of(&self.completed);
        let running: Vec<Arc<RuntimeStats>> = self
            .tasks
            .iter()
            .filter_map(|e| match e.value() {
                TaskSlot::Running(stats) => Some(Arc::clone(stats)),
                TaskSlot::Completed => None,
            })
            .collect();
        for task in &running {
            stats.merge_with(Some(task.as_ref()));
        }
        stats
    }
}
