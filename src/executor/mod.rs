// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Bounded concurrent executor.
//!
//! [`VirtualExecutor`] decouples "how many logical tasks exist" from "how
//! many run truly concurrently": every submission spawns one cheap async
//! task immediately, but each task must acquire a permit from a counting
//! semaphore sized to the configured width before its delegate runs. The
//! submission queue is therefore unbounded and never blocks the submitter,
//! while true concurrency stays strictly capped.
//!
//! Around every delegate the executor layers:
//!
//! * **context propagation**: the submitter's [`tracing`] span is captured
//!   at submission time and re-established on the worker
//!   ([`context::TaskContext`]);
//! * **timing instrumentation**: creation, execution-start and finished
//!   instants are folded into an *enqueued* and an *execution* duration and
//!   reported to the [`PoolMonitoring`] registry the pool was built with.
//!
//! Shutdown comes in two modes selected at construction: graceful (`close`
//! lets running tasks finish, optionally bounded by a termination timeout)
//! and interrupting (in-flight tasks are cancelled at their next await
//! point). Either way the pool unregisters from the monitoring registry.

pub mod builder;
pub mod context;

pub use builder::VirtualExecutorBuilder;
pub use context::TaskContext;

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{oneshot, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::errors::PgeError;
use crate::monitoring::{MonitoredPool, PoolMonitoring};
use crate::observability::messages::executor::{PoolClosed, PoolClosing};
use crate::observability::messages::StructuredLog;
use crate::traits::{TaskFuture, TaskPool};

/// Executor with virtual-task-per-submission semantics and a hard cap on
/// concurrently executing delegates. Built via [`VirtualExecutorBuilder`].
pub struct VirtualExecutor {
    pool_id: String,
    description: String,
    concurrency: usize,
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
    cancellation: CancellationToken,
    interrupt_on_shutdown: bool,
    termination_timeout: Option<Duration>,
    monitoring: Option<Arc<PoolMonitoring>>,
    tasks_pending: Arc<AtomicUsize>,
    exec_ids: AtomicU64,
    closed: AtomicBool,
}

impl VirtualExecutor {
    pub(crate) fn new(
        pool_id: String,
        description: String,
        concurrency: usize,
        interrupt_on_shutdown: bool,
        termination_timeout: Option<Duration>,
        monitoring: Option<Arc<PoolMonitoring>>,
    ) -> Self {
        Self {
            pool_id,
            description,
            concurrency,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            tracker: TaskTracker::new(),
            cancellation: CancellationToken::new(),
            interrupt_on_shutdown,
            termination_timeout,
            monitoring,
            tasks_pending: Arc::new(AtomicUsize::new(0)),
            exec_ids: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Generated identifier this pool is registered under.
    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Configured concurrency width.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Queue a task. Returns immediately; the task runs once it obtains one
    /// of the pool's permits. Rejected once `close()` has begun, so a
    /// submitter never waits on a task that will not run.
    pub fn spawn<F>(&self, task: F) -> Result<(), PgeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PgeError::PoolShutDown {
                description: self.description.clone(),
            });
        }

        let created = Instant::now();
        let monitoring = self.monitoring.clone();
        if monitoring.is_some() {
            self.tasks_pending.fetch_add(1, Ordering::Relaxed);
        }

        let semaphore = Arc::clone(&self.semaphore);
        let pending = Arc::clone(&self.tasks_pending);
        let pool_id = self.pool_id.clone();
        let exec_id = self.exec_ids.fetch_add(1, Ordering::Relaxed) + 1;
        let interrupt = self.interrupt_on_shutdown;
        let cancellation = self.cancellation.clone();
        let context = TaskContext::capture();

        self.tracker.spawn(context.apply(async move {
            // Closed semaphore means the pool was interrupted before this
            // task ever started; it is dropped unrun.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                if monitoring.is_some() {
                    pending.fetch_sub(1, Ordering::Relaxed);
                }
                return;
            };

            if let Some(registry) = &monitoring {
                pending.fetch_sub(1, Ordering::Relaxed);
                registry.before_execution(&pool_id, exec_id);
            }

            let started = Instant::now();
            if interrupt {
                tokio::select! {
                    _ = cancellation.cancelled() => {}
                    _ = task => {}
                }
            } else {
                task.await;
            }
            let finished = Instant::now();

            if let Some(registry) = &monitoring {
                registry.after_execution(&pool_id, exec_id);
                registry.record_execution(&pool_id, started - created, finished - started);
            }
        }));
        Ok(())
    }

    /// Queue a value-producing task. The receiver yields the task's output,
    /// or an error if the pool was shut down before the task could finish.
    pub fn submit<F, T>(&self, task: F) -> Result<oneshot::Receiver<T>, PgeError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.spawn(async move {
            let _ = tx.send(task.await);
        })?;
        Ok(rx)
    }

    /// Shut the pool down.
    ///
    /// Graceful mode waits for in-flight tasks; interrupting mode cancels
    /// them at their next await point first. Waiting is bounded by the
    /// configured termination timeout, if any; exceeding it surfaces
    /// [`PgeError::PoolTerminationElapsed`]. Idempotent, and the pool is
    /// unregistered from monitoring regardless of outcome.
    pub async fn close(&self) -> Result<(), PgeError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        PoolClosing {
            description: &self.description,
            interrupt: self.interrupt_on_shutdown,
        }
        .log();
        let begun = Instant::now();

        self.tracker.close();
        if self.interrupt_on_shutdown {
            self.cancellation.cancel();
            // Wake tasks still waiting on a permit so they observe shutdown.
            self.semaphore.close();
        }

        let outcome = match self.termination_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.tracker.wait())
                .await
                .map_err(|_| PgeError::PoolTerminationElapsed {
                    description: self.description.clone(),
                    timeout,
                }),
            None => {
                self.tracker.wait().await;
                Ok(())
            }
        };

        if let Some(registry) = &self.monitoring {
            registry.unregister(&self.pool_id);
        }
        PoolClosed {
            description: &self.description,
            elapsed: begun.elapsed(),
        }
        .log();

        outcome
    }
}

impl MonitoredPool for VirtualExecutor {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn pool_size(&self) -> usize {
        self.concurrency
    }

    fn pending_tasks(&self) -> usize {
        self.tasks_pending.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TaskPool for VirtualExecutor {
    fn spawn_task(&self, task: TaskFuture) -> Result<(), PgeError> {
        self.spawn(task)
    }

    async fn close(&self) -> Result<(), PgeError> {
        VirtualExecutor::close(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn pool(width: usize) -> Arc<VirtualExecutor> {
        VirtualExecutorBuilder::new_pool()
            .concurrency(width)
            .description("test-pool")
            .build()
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_never_exceeds_the_configured_width() {
        let executor = pool(3);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            executor
                .spawn(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        executor.close().await.unwrap();
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(running.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_returns_the_task_value() {
        let executor = pool(1);
        let rx = executor.submit(async { 6 * 7 }).unwrap();
        assert_eq!(rx.await.unwrap(), 42);
        executor.close().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn graceful_close_waits_for_in_flight_tasks() {
        let executor = pool(1);
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        executor
            .spawn(async move {
                sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
            })
            .unwrap();

        executor.close().await.unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn close_is_idempotent() {
        let executor = pool(1);
        executor.close().await.unwrap();
        executor.close().await.unwrap();
    }

    #[tokio::test]
    async fn spawn_after_close_is_rejected() {
        let executor = pool(1);
        executor.close().await.unwrap();

        let err = executor.spawn(async {}).err().unwrap();
        assert!(matches!(err, PgeError::PoolShutDown { .. }));
        assert!(executor.submit(async { 1 }).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn termination_timeout_elapses_on_stuck_tasks() {
        let executor = VirtualExecutorBuilder::new_pool()
            .concurrency(1)
            .termination_timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        executor
            .spawn(async {
                sleep(Duration::from_secs(5)).await;
            })
            .unwrap();

        match executor.close().await {
            Err(PgeError::PoolTerminationElapsed { timeout, .. }) => {
                assert_eq!(timeout, Duration::from_millis(20));
            }
            other => panic!("expected PoolTerminationElapsed, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn interrupting_close_cancels_running_tasks() {
        let executor = VirtualExecutorBuilder::new_pool()
            .concurrency(1)
            .interrupt_on_shutdown(true)
            .build()
            .unwrap();

        let finished = Arc::new(AtomicBool::new(false));
        let started = Arc::new(AtomicBool::new(false));
        let (f, s) = (Arc::clone(&finished), Arc::clone(&started));
        executor
            .spawn(async move {
                s.store(true, Ordering::SeqCst);
                sleep(Duration::from_secs(5)).await;
                f.store(true, Ordering::SeqCst);
            })
            .unwrap();

        // Let the task actually start before interrupting it.
        sleep(Duration::from_millis(30)).await;
        assert!(started.load(Ordering::SeqCst));

        let begun = Instant::now();
        executor.close().await.unwrap();
        assert!(begun.elapsed() < Duration::from_secs(1));
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn monitored_pool_reports_timings_to_the_registry() {
        let registry = Arc::new(PoolMonitoring::new());
        let executor = VirtualExecutorBuilder::new_pool()
            .concurrency(2)
            .description("monitored")
            .monitoring(Arc::clone(&registry))
            .build()
            .unwrap();
        let pool_id = executor.pool_id().to_string();

        for _ in 0..5 {
            executor
                .spawn(async {
                    sleep(Duration::from_millis(5)).await;
                })
                .unwrap();
        }

        // Snapshot exists while the pool is alive.
        assert!(registry.snapshot(&pool_id).is_some());

        // Wait for all tasks, then check aggregates before close unregisters.
        executor.tracker.close();
        executor.tracker.wait().await;
        let snap = registry.snapshot(&pool_id).unwrap();
        assert_eq!(snap.executions, 5);
        assert_eq!(snap.pending_tasks, 0);
        assert_eq!(snap.description, "monitored");
        assert!(snap.execution_avg >= Duration::from_millis(5));

        executor.close().await.unwrap();
        assert!(registry.snapshot(&pool_id).is_none());
    }
}
