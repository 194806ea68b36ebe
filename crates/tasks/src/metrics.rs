//! Executor counters, labelled by task kind.

use metrics::{Counter, Gauge};

/// Whether a task runs under the permit pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKind {
    /// Bounded by the executor's permits.
    Regular,
    /// Runs outside the permit pool.
    Critical,
}

impl TaskKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Critical => "critical",
        }
    }
}

/// Counters for one [`TaskKind`].
#[derive(Clone, Debug)]
struct KindCounters {
    spawned: Counter,
    finished: Counter,
}

impl KindCounters {
    fn new(kind: TaskKind) -> Self {
        let label = kind.label();
        Self {
            spawned: metrics::counter!("executor.spawn.tasks_total", "kind" => label),
            finished: metrics::counter!("executor.spawn.finished_tasks_total", "kind" => label),
        }
    }
}

/// Task executor metrics.
#[derive(Clone, Debug)]
pub(crate) struct TaskExecutorMetrics {
    regular: KindCounters,
    critical: KindCounters,
    /// Regular tasks dropped because the executor was closed.
    rejected: Counter,
    /// Critical tasks that panicked.
    panicked: Counter,
    /// Regular tasks spawned but still waiting for a permit.
    waiting: Gauge,
}

impl Default for TaskExecutorMetrics {
    fn default() -> Self {
        Self {
            regular: KindCounters::new(TaskKind::Regular),
            critical: KindCounters::new(TaskKind::Critical),
            rejected: metrics::counter!("executor.spawn.rejected_tasks_total"),
            panicked: metrics::counter!("executor.spawn.panicked_tasks_total"),
            waiting: metrics::gauge!("executor.permits.waiting"),
        }
    }
}

impl TaskExecutorMetrics {
    fn counters(&self, kind: TaskKind) -> &KindCounters {
        match kind {
            TaskKind::Regular => &self.regular,
            TaskKind::Critical => &self.critical,
        }
    }

    /// Count a spawn and return a guard that counts the finish when dropped,
    /// whether the task completes, panics or is aborted.
    pub(crate) fn spawned(&self, kind: TaskKind) -> FinishGuard {
        let counters = self.counters(kind);
        counters.spawned.increment(1);
        FinishGuard(counters.finished.clone())
    }

    /// Track a regular task while it waits for a permit.
    pub(crate) fn waiting(&self) -> WaitingGuard {
        self.waiting.increment(1.0);
        WaitingGuard(self.waiting.clone())
    }

    pub(crate) fn rejected(&self) {
        self.rejected.increment(1);
    }

    pub(crate) fn panicked(&self) {
        self.panicked.increment(1);
    }
}

/// Counts a task as finished when dropped.
#[derive(Debug)]
pub(crate) struct FinishGuard(Counter);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.increment(1);
    }
}

/// Lowers the waiting gauge when dropped.
#[derive(Debug)]
pub(crate) struct WaitingGuard(Gauge);

impl Drop for WaitingGuard {
    fn drop(&mut self) {
        self.0.decrement(1.0);
    }
}
