// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Worker-pool abstraction consumed by the scheduler.
//!
//! The scheduler does not care *how* tasks run, only that queueing is cheap
//! and unbounded while true concurrency stays capped by the pool. The crate
//! ships [`crate::executor::VirtualExecutor`] as the default implementation;
//! callers with their own execution substrate supply anything implementing
//! [`TaskPool`] via `PgeBuilder::with_executor`.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

use crate::errors::PgeError;

/// Boxed unit of work handed to a [`TaskPool`].
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A bounded executor of fire-and-forget tasks.
#[async_trait]
pub trait TaskPool: Send + Sync {
    /// Queue a task for execution.
    ///
    /// Must never block the submitter: acceptance is unbounded, and the
    /// implementation gates how many queued tasks actually run concurrently.
    /// A pool whose shutdown already began must reject the task with
    /// [`PgeError::PoolShutDown`] instead of silently dropping it.
    fn spawn_task(&self, task: TaskFuture) -> Result<(), PgeError>;

    /// Shut the pool down and wait for in-flight work, subject to the
    /// implementation's shutdown mode (graceful or interrupting) and
    /// termination timeout. Must be idempotent.
    async fn close(&self) -> Result<(), PgeError>;
}
