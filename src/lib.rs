// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Parallel graph execution.
//!
//! `pge` runs a set of interdependent work items in parallel, guaranteeing
//! that every item starts only after all items it depends on finished, that
//! no item runs twice even when the graph is discovered through redundant
//! multi-edges, and that a dependency cycle terminates the run with a
//! structural error instead of a hang.
//!
//! The dependency graph is discovered lazily from a set of starting items
//! and a caller-supplied resolver, and executed through a bounded executor
//! that spawns one cheap task per item while capping true concurrency with
//! a permit pool.
//!
//! ```
//! use pge::ParallelGraphExecution;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), pge::PgeError> {
//! let result = ParallelGraphExecution::foreach("sizes", ["alpha", "beta"])
//!     .items_to_process_first(|_item: &&str| vec![])
//!     .with_thread_pool(4)
//!     .run(|item: &&str| Ok(item.len()))
//!     .await?;
//!
//! assert_eq!(result.get(&"alpha").unwrap().value(), Some(&5));
//! # Ok(())
//! # }
//! ```

pub mod engine;        // graph scheduler and public builder API
pub mod errors;        // error handling
pub mod executor;      // bounded concurrent executor
pub mod graph;         // lazily discovered dependency graph
pub mod monitoring;    // per-pool execution statistics registry
pub mod observability; // structured logging
pub mod traits;        // worker-pool abstraction

pub use engine::{ParallelGraphExecution, PgeItemResult, PgeResult};
pub use errors::PgeError;
pub use executor::{VirtualExecutor, VirtualExecutorBuilder};
pub use graph::PgeGraph;
pub use monitoring::{MonitoredPool, PoolMonitoring, PoolSnapshot};
pub use traits::TaskPool;
