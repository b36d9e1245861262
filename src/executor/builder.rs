// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Fluent construction of [`VirtualExecutor`] pools.

use std::sync::{Arc, Weak};
use std::time::Duration;

use uuid::Uuid;

use crate::errors::PgeError;
use crate::executor::VirtualExecutor;
use crate::monitoring::{MonitoredPool, PoolMonitoring};
use crate::observability::messages::executor::PoolConstructed;
use crate::observability::messages::StructuredLog;

/// Builder for [`VirtualExecutor`].
///
/// Concurrency is the only required parameter; everything else has a safe
/// default (graceful shutdown, no termination bound, no monitoring).
///
/// ```
/// use pge::executor::VirtualExecutorBuilder;
///
/// let pool = VirtualExecutorBuilder::new_pool()
///     .concurrency(4)
///     .description("resource-loader")
///     .build()
///     .unwrap();
/// assert_eq!(pool.concurrency(), 4);
/// ```
pub struct VirtualExecutorBuilder {
    concurrency: Option<usize>,
    description: Option<String>,
    interrupt_on_shutdown: bool,
    termination_timeout: Option<Duration>,
    monitoring: Option<Arc<PoolMonitoring>>,
}

impl VirtualExecutorBuilder {
    pub fn new_pool() -> Self {
        Self {
            concurrency: None,
            description: None,
            interrupt_on_shutdown: false,
            termination_timeout: None,
            monitoring: None,
        }
    }

    /// Maximum number of concurrently executing delegates. Required, ≥ 1.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Human-readable pool description, used in logs and monitoring.
    /// Defaults to `anonymous-<pool-id>`.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Cancel in-flight tasks on `close()` instead of waiting for them.
    pub fn interrupt_on_shutdown(mut self, interrupt: bool) -> Self {
        self.interrupt_on_shutdown = interrupt;
        self
    }

    /// Upper bound on how long `close()` waits for termination.
    pub fn termination_timeout(mut self, timeout: Duration) -> Self {
        self.termination_timeout = Some(timeout);
        self
    }

    /// Registry the pool registers itself with and reports timings to.
    /// Without one, monitoring is disabled entirely.
    pub fn monitoring(mut self, registry: Arc<PoolMonitoring>) -> Self {
        self.monitoring = Some(registry);
        self
    }

    /// Construct the pool, registering it with the monitoring registry if
    /// one was supplied.
    pub fn build(self) -> Result<Arc<VirtualExecutor>, PgeError> {
        let concurrency = self.concurrency.ok_or_else(|| PgeError::InvalidConfiguration {
            message: "concurrency is not set".into(),
        })?;
        if concurrency == 0 {
            return Err(PgeError::InvalidConfiguration {
                message: "concurrency must be at least 1".into(),
            });
        }

        let pool_id = Uuid::new_v4().to_string();
        let description = self
            .description
            .unwrap_or_else(|| format!("anonymous-{pool_id}"));

        let executor = Arc::new(VirtualExecutor::new(
            pool_id.clone(),
            description.clone(),
            concurrency,
            self.interrupt_on_shutdown,
            self.termination_timeout,
            self.monitoring.clone(),
        ));

        if let Some(registry) = &self.monitoring {
            let weak = Arc::downgrade(&executor);
            let provider: Weak<dyn MonitoredPool> = weak;
            registry.register(pool_id, provider);
        }

        PoolConstructed {
            description: &description,
            concurrency,
        }
        .log();

        Ok(executor)
    }
}
