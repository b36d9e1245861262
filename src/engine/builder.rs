// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Public entry point for parallel graph execution.
//!
//! A run is described fluently: name the batch and its starting items, pick
//! the resolution direction, pick a worker pool, then `run` a callback:
//!
//! ```
//! use pge::ParallelGraphExecution;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), pge::PgeError> {
//! // "a" depends on "b"; "b" must therefore run first.
//! let result = ParallelGraphExecution::foreach("demo", ["a"])
//!     .items_to_process_first(|item: &&str| if *item == "a" { vec!["b"] } else { vec![] })
//!     .with_thread_pool(2)
//!     .run(|item: &&str| Ok(item.len()))
//!     .await?;
//!
//! assert!(!result.has_error());
//! assert_eq!(result.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! `run` resolves once every discovered item is terminal and returns the
//! complete per-item result map; structural problems (missing pool
//! configuration, dependency cycles) surface as [`PgeError`] instead.

use std::hash::Hash;
use std::sync::Arc;

use crate::engine::result::PgeResult;
use crate::engine::scheduler;
use crate::errors::PgeError;
use crate::executor::{VirtualExecutor, VirtualExecutorBuilder};
use crate::graph::PgeGraph;
use crate::monitoring::PoolMonitoring;
use crate::traits::TaskPool;

/// Namespace for starting a run; see [`ParallelGraphExecution::foreach`].
pub struct ParallelGraphExecution;

impl ParallelGraphExecution {
    /// Open a run named `name` over the given starting items. The name only
    /// appears in logs and error messages.
    pub fn foreach<N>(name: impl Into<String>, items: impl IntoIterator<Item = N>) -> PgeItems<N> {
        PgeItems {
            name: name.into(),
            items: items.into_iter().collect(),
        }
    }
}

/// Intermediate builder state: items chosen, resolution direction pending.
pub struct PgeItems<N> {
    name: String,
    items: Vec<N>,
}

impl<N> PgeItems<N>
where
    N: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// The resolver yields, for an item, the items that must be processed
    /// *before* it (its dependencies).
    pub fn items_to_process_first<R>(self, resolver: R) -> PgeBuilder<N>
    where
        R: FnMut(&N) -> Vec<N> + Send + 'static,
    {
        self.with_resolver(resolver, Direction::DependenciesFirst)
    }

    /// The resolver yields, for an item, the items that may only be
    /// processed *after* it (its dependers).
    pub fn items_to_process_after<R>(self, resolver: R) -> PgeBuilder<N>
    where
        R: FnMut(&N) -> Vec<N> + Send + 'static,
    {
        self.with_resolver(resolver, Direction::DependersAfter)
    }

    fn with_resolver<R>(self, resolver: R, direction: Direction) -> PgeBuilder<N>
    where
        R: FnMut(&N) -> Vec<N> + Send + 'static,
    {
        PgeBuilder {
            name: self.name,
            items: self.items,
            resolver: Box::new(resolver),
            direction,
            pool: PoolChoice::Unset,
            monitoring: None,
        }
    }
}

enum Direction {
    DependenciesFirst,
    DependersAfter,
}

enum PoolChoice {
    Unset,
    Width(usize),
    External(Arc<dyn TaskPool>),
}

/// Fully specified run, ready for `run`.
pub struct PgeBuilder<N> {
    name: String,
    items: Vec<N>,
    resolver: Box<dyn FnMut(&N) -> Vec<N> + Send>,
    direction: Direction,
    pool: PoolChoice,
    monitoring: Option<Arc<PoolMonitoring>>,
}

impl<N> PgeBuilder<N>
where
    N: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// Create an internal worker pool of the given width for this run. The
    /// pool is shut down gracefully when the run finishes.
    pub fn with_thread_pool(mut self, width: usize) -> Self {
        self.pool = PoolChoice::Width(width);
        self
    }

    /// Use an externally managed pool instead; its lifecycle stays with the
    /// caller.
    pub fn with_executor(mut self, pool: Arc<dyn TaskPool>) -> Self {
        self.pool = PoolChoice::External(pool);
        self
    }

    /// Monitoring registry for the internally created pool. Ignored when an
    /// external executor is supplied.
    pub fn with_monitoring(mut self, registry: Arc<PoolMonitoring>) -> Self {
        self.monitoring = Some(registry);
        self
    }

    /// Execute the graph, one callback invocation per discovered item.
    ///
    /// The callback is synchronous and may block or do heavy CPU work; it
    /// is dispatched to the runtime's blocking thread pool so it never
    /// stalls unrelated async tasks. Callback errors and panics are
    /// captured into the per-item results (`PgeResult::has_error`); only
    /// structural problems (missing pool configuration, a dependency cycle,
    /// a pool that was already shut down) are returned as `Err`.
    pub async fn run<T, F>(mut self, callback: F) -> Result<PgeResult<N, T>, PgeError>
    where
        T: Send + 'static,
        F: Fn(&N) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        // Pool configuration is validated before any traversal starts.
        let (pool, owned): (Arc<dyn TaskPool>, Option<Arc<VirtualExecutor>>) = match self.pool {
            PoolChoice::Unset => {
                return Err(PgeError::InvalidConfiguration {
                    message: format!(
                        "execution '{}': no worker pool configured; \
                         use with_thread_pool or with_executor",
                        self.name
                    ),
                });
            }
            PoolChoice::Width(width) => {
                let mut builder = VirtualExecutorBuilder::new_pool()
                    .concurrency(width)
                    .description(format!("pge-{}", self.name));
                if let Some(registry) = self.monitoring.take() {
                    builder = builder.monitoring(registry);
                }
                let executor = builder.build()?;
                (Arc::clone(&executor) as Arc<dyn TaskPool>, Some(executor))
            }
            PoolChoice::External(pool) => (pool, None),
        };

        let mut resolver = self.resolver;
        let graph = match self.direction {
            Direction::DependenciesFirst => {
                PgeGraph::for_child_resolver(self.items, |item| resolver(item))
            }
            Direction::DependersAfter => {
                PgeGraph::for_parent_resolver(self.items, |item| resolver(item))
            }
        };

        let outcome = scheduler::execute(&self.name, graph, pool, Arc::new(callback)).await;

        // An internal pool is drained even when the run itself failed.
        if let Some(executor) = owned {
            executor.close().await?;
        }
        outcome
    }

    /// Convenience for pure consumers: like [`run`](Self::run) but the
    /// callback produces no value.
    pub async fn run_each<F>(self, callback: F) -> Result<PgeResult<N, ()>, PgeError>
    where
        F: Fn(&N) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.run(callback).await
    }
}
