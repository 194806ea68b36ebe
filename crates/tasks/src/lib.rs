//! Task management.
//!
//! [`TaskExecutor`] spawns named background tasks on a tokio runtime. Regular
//! tasks share a bounded pool of permits: spawning never blocks the caller,
//! but at most `max_concurrent` regular tasks run at once and the rest wait
//! for a permit inside their own task.

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{runtime::Handle, sync::Semaphore, task::JoinHandle};
use tracing::{Instrument, error, trace};

mod metrics;

use metrics::{TaskExecutorMetrics, TaskKind};

/// Errors from constructing an executor.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Not called from within a tokio runtime.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Spawns background tasks with bounded concurrency.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    handle: Handle,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    metrics: TaskExecutorMetrics,
}

impl TaskExecutor {
    /// Create an executor on `handle` running at most `max_concurrent` regular tasks.
    pub fn new(handle: Handle, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            handle,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            metrics: TaskExecutorMetrics::default(),
        }
    }

    /// Create an executor on the current runtime.
    pub fn try_current(max_concurrent: usize) -> Result<Self, TaskError> {
        Ok(Self::new(Handle::try_current()?, max_concurrent))
    }

    /// The runtime handle tasks are spawned on.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Number of regular tasks that could start right now.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Configured bound on concurrently running regular tasks.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Spawn a regular task.
    ///
    /// The task waits for a permit before running `fut`. If the executor is
    /// closed first, `fut` is dropped without running.
    pub fn spawn<F>(&self, name: &'static str, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let finished = self.metrics.spawned(TaskKind::Regular);
        let waiting = self.metrics.waiting();
        let permits = Arc::clone(&self.permits);
        let metrics = self.metrics.clone();

        let task = async move {
            let _finished = finished;
            let permit = permits.acquire_owned().await;
            drop(waiting);
            let Ok(_permit) = permit else {
                trace!("executor closed, task dropped");
                metrics.rejected();
                return;
            };
            trace!("task started");
            fut.await;
        };

        self.handle
            .spawn(task.instrument(tracing::debug_span!("task", task = name)))
    }

    /// Spawn a critical task.
    ///
    /// Critical tasks do not take a permit and keep running after
    /// [`close`](Self::close). A panic is caught and logged.
    pub fn spawn_critical<F>(&self, name: &'static str, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let finished = self.metrics.spawned(TaskKind::Critical);
        let metrics = self.metrics.clone();

        let task = async move {
            let _finished = finished;
            if AssertUnwindSafe(fut).catch_unwind().await.is_err() {
                metrics.panicked();
                error!(task = name, "critical task panicked");
            }
        };

        self.handle.spawn(task)
    }

    /// Stop starting regular tasks.
    ///
    /// Tasks already running finish normally. Tasks still waiting for a
    /// permit, and any spawned afterwards, are dropped. Shared by every clone.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_runs_task() {
        let executor = TaskExecutor::try_current(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let handles = (0..10)
            .map(|_| {
                let counter = counter.clone();
                executor.spawn("increment", async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert_eq!(executor.available_permits(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let executor = TaskExecutor::try_current(2).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles = (0..8)
            .map(|_| {
                let running = running.clone();
                let peak = peak.clone();
                executor.spawn("bounded", async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_critical_panic_is_contained() {
        let executor = TaskExecutor::try_current(1).unwrap();
        let handle = executor.spawn_critical("panics", async {
            panic!("boom");
        });
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_close_drops_waiting_tasks() {
        let executor = TaskExecutor::try_current(1).unwrap();
        let (release, hold) = tokio::sync::oneshot::channel::<()>();
        let ran = Arc::new(AtomicUsize::new(0));

        let holder = {
            let ran = ran.clone();
            executor.spawn("holder", async move {
                let _ = hold.await;
                ran.fetch_add(1, Ordering::SeqCst);
            })
        };
        tokio::task::yield_now().await;
        assert_eq!(executor.available_permits(), 0);

        let queued = {
            let ran = ran.clone();
            executor.spawn("queued", async move {
                ran.fetch_add(10, Ordering::SeqCst);
            })
        };
        executor.close();
        assert!(executor.clone().is_closed());

        queued.await.unwrap();
        let late = {
            let ran = ran.clone();
            executor.spawn("late", async move {
                ran.fetch_add(100, Ordering::SeqCst);
            })
        };
        late.await.unwrap();

        // The running task is unaffected.
        release.send(()).unwrap();
        holder.await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        // Critical tasks ignore the permit pool.
        let critical = {
            let ran = ran.clone();
            executor.spawn_critical("critical", async move {
                ran.fetch_add(1000, Ordering::SeqCst);
            })
        };
        critical.await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1001);
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(matches!(
            TaskExecutor::try_current(1),
            Err(TaskError::NoRuntime(_))
        ));
    }
}
