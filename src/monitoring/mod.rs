// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Per-pool execution monitoring.
//!
//! [`PoolMonitoring`] is an explicitly passed registry handle rather than
//! process-global state: an application creates one (typically at startup),
//! hands it to each executor at construction, and queries it for live
//! statistics. Executors register themselves under a generated pool id,
//! report per-task timings while running, and unregister on shutdown.
//!
//! Timing is pure observability and never feeds back into scheduling: for
//! every task two durations are recorded, the *enqueued* time (submission
//! until a permit was acquired) and the *execution* time (permit acquired
//! until the task finished).

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, Weak};
use std::time::Duration;

/// Live-statistics provider registered alongside timing aggregates.
///
/// Implemented by the pool itself; the registry keeps only a [`Weak`]
/// reference so a dropped pool never lingers.
pub trait MonitoredPool: Send + Sync {
    /// Human-readable description of the pool.
    fn description(&self) -> String;

    /// Configured concurrency width.
    fn pool_size(&self) -> usize;

    /// Tasks submitted but not yet started.
    fn pending_tasks(&self) -> usize;
}

/// Point-in-time statistics for one registered pool.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub description: String,
    pub pool_size: usize,
    pub pending_tasks: usize,
    /// Tasks currently between `before_execution` and `after_execution`.
    pub running: usize,
    /// Completed task count.
    pub executions: u64,
    pub enqueued_min: Duration,
    pub enqueued_max: Duration,
    pub enqueued_avg: Duration,
    pub execution_avg: Duration,
}

struct PoolEntry {
    provider: Weak<dyn MonitoredPool>,
    running: HashSet<u64>,
    executions: u64,
    enqueued_min: Option<Duration>,
    enqueued_max: Duration,
    enqueued_total: Duration,
    execution_total: Duration,
}

impl PoolEntry {
    fn new(provider: Weak<dyn MonitoredPool>) -> Self {
        Self {
            provider,
            running: HashSet::new(),
            executions: 0,
            enqueued_min: None,
            enqueued_max: Duration::ZERO,
            enqueued_total: Duration::ZERO,
            execution_total: Duration::ZERO,
        }
    }
}

/// Registry of monitored pools, shared across unrelated executor instances.
#[derive(Default)]
pub struct PoolMonitoring {
    pools: Mutex<HashMap<String, PoolEntry>>,
}

impl PoolMonitoring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool under its generated id. Re-registering the same id
    /// replaces the previous entry.
    pub fn register(&self, pool_id: impl Into<String>, provider: Weak<dyn MonitoredPool>) {
        let pool_id = pool_id.into();
        tracing::debug!(pool_id = %pool_id, "registering thread pool");
        self.lock().insert(pool_id, PoolEntry::new(provider));
    }

    /// Remove a pool; a no-op for unknown ids.
    pub fn unregister(&self, pool_id: &str) {
        tracing::debug!(pool_id = %pool_id, "unregistering thread pool");
        self.lock().remove(pool_id);
    }

    /// A task acquired its permit and is about to run.
    pub fn before_execution(&self, pool_id: &str, exec_id: u64) {
        if let Some(entry) = self.lock().get_mut(pool_id) {
            entry.running.insert(exec_id);
        }
    }

    /// The task with the given execution id finished (in any way).
    pub fn after_execution(&self, pool_id: &str, exec_id: u64) {
        if let Some(entry) = self.lock().get_mut(pool_id) {
            entry.running.remove(&exec_id);
        }
    }

    /// Record the two observed durations of one completed task.
    pub fn record_execution(&self, pool_id: &str, enqueued: Duration, execution: Duration) {
        if let Some(entry) = self.lock().get_mut(pool_id) {
            entry.executions += 1;
            entry.enqueued_min = Some(match entry.enqueued_min {
                Some(min) => min.min(enqueued),
                None => enqueued,
            });
            entry.enqueued_max = entry.enqueued_max.max(enqueued);
            entry.enqueued_total += enqueued;
            entry.execution_total += execution;
        }
    }

    /// Statistics for one pool, or `None` if the id is unknown or the pool
    /// itself is already gone.
    pub fn snapshot(&self, pool_id: &str) -> Option<PoolSnapshot> {
        let guard = self.lock();
        let entry = guard.get(pool_id)?;
        let provider = entry.provider.upgrade()?;
        let avg = |total: Duration| {
            if entry.executions == 0 {
                Duration::ZERO
            } else {
                total / entry.executions as u32
            }
        };
        Some(PoolSnapshot {
            description: provider.description(),
            pool_size: provider.pool_size(),
            pending_tasks: provider.pending_tasks(),
            running: entry.running.len(),
            executions: entry.executions,
            enqueued_min: entry.enqueued_min.unwrap_or(Duration::ZERO),
            enqueued_max: entry.enqueued_max,
            enqueued_avg: avg(entry.enqueued_total),
            execution_avg: avg(entry.execution_total),
        })
    }

    /// Ids of all currently registered pools.
    pub fn pool_ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PoolEntry>> {
        // A panic while holding this lock leaves only statistics behind;
        // recover the data rather than propagating poison.
        self.pools
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct FakePool;

    impl MonitoredPool for FakePool {
        fn description(&self) -> String {
            "fake".into()
        }
        fn pool_size(&self) -> usize {
            4
        }
        fn pending_tasks(&self) -> usize {
            2
        }
    }

    #[test]
    fn snapshot_aggregates_min_max_avg() {
        let registry = PoolMonitoring::new();
        let pool: Arc<dyn MonitoredPool> = Arc::new(FakePool);
        registry.register("p1", Arc::downgrade(&pool));

        registry.record_execution("p1", Duration::from_millis(10), Duration::from_millis(100));
        registry.record_execution("p1", Duration::from_millis(30), Duration::from_millis(200));

        let snap = registry.snapshot("p1").unwrap();
        assert_eq!(snap.description, "fake");
        assert_eq!(snap.pool_size, 4);
        assert_eq!(snap.pending_tasks, 2);
        assert_eq!(snap.executions, 2);
        assert_eq!(snap.enqueued_min, Duration::from_millis(10));
        assert_eq!(snap.enqueued_max, Duration::from_millis(30));
        assert_eq!(snap.enqueued_avg, Duration::from_millis(20));
        assert_eq!(snap.execution_avg, Duration::from_millis(150));
    }

    #[test]
    fn running_count_tracks_before_and_after() {
        let registry = PoolMonitoring::new();
        let pool: Arc<dyn MonitoredPool> = Arc::new(FakePool);
        registry.register("p1", Arc::downgrade(&pool));

        registry.before_execution("p1", 1);
        registry.before_execution("p1", 2);
        assert_eq!(registry.snapshot("p1").unwrap().running, 2);

        registry.after_execution("p1", 1);
        assert_eq!(registry.snapshot("p1").unwrap().running, 1);
    }

    #[test]
    fn unregistered_or_dropped_pools_yield_no_snapshot() {
        let registry = PoolMonitoring::new();
        assert!(registry.snapshot("missing").is_none());

        let pool: Arc<dyn MonitoredPool> = Arc::new(FakePool);
        registry.register("p1", Arc::downgrade(&pool));
        assert!(registry.snapshot("p1").is_some());

        drop(pool);
        assert!(registry.snapshot("p1").is_none());

        registry.unregister("p1");
        assert!(registry.pool_ids().is_empty());
    }
}
