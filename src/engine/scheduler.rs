// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Event-driven readiness scheduling over a [`PgeGraph`].
//!
//! The scheduler is topological but level-free: a node becomes ready the
//! instant its *last* dependency reaches a terminal state, not when a whole
//! "layer" finishes. Per-node bookkeeping is a live remaining-dependency
//! counter seeded from the graph's construction-time child counts.
//!
//! All completions funnel through a single mpsc channel consumed by the
//! coordinating loop, so every decrement-and-check of a parent counter is
//! serialized; a parent can never be submitted twice even when several of
//! its children finish on different workers at the same instant. Nodes that
//! become ready together are submitted in discovery order thanks to the
//! FIFO tie-break of [`ReadyQueue`].
//!
//! Cycle detection falls out of the same bookkeeping instead of a separate
//! pass (linear in edges, not quadratic on dense graphs): when nothing is in
//! flight and nothing is ready but some nodes are still non-terminal, those
//! nodes can never run, and the whole run fails with
//! [`PgeError::CycleDetected`].

use std::any::Any;
use std::hash::Hash;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinError;

use crate::engine::ready_queue::ReadyQueue;
use crate::engine::result::{PgeItemResult, PgeResult};
use crate::errors::PgeError;
use crate::graph::{NodeId, PgeGraph};
use crate::observability::messages::engine::{
    ExecutionCompleted, ExecutionStarted, ExecutionStuck, ItemFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::TaskPool;

/// Drive every node of `graph` through `pool`, respecting dependency order.
///
/// Blocks (asynchronously) until all discovered nodes are terminal. Item
/// callback failures are captured per node and do not stop independent
/// branches; a failed node still counts as "finished" for its dependers.
pub(crate) async fn execute<N, T, F>(
    name: &str,
    graph: PgeGraph<N>,
    pool: Arc<dyn TaskPool>,
    callback: Arc<F>,
) -> Result<PgeResult<N, T>, PgeError>
where
    N: Clone + Eq + Hash + Send + Sync + 'static,
    T: Send + 'static,
    F: Fn(&N) -> anyhow::Result<T> + Send + Sync + 'static,
{
    let total = graph.len();
    ExecutionStarted { name, items: total }.log();

    let graph = Arc::new(graph);
    let mut remaining: Vec<usize> = (0..total).map(|id| graph.child_count(id)).collect();

    // All ready nodes rank equal; the unit priority leaves pure FIFO order.
    let mut ready: ReadyQueue<(), NodeId> = ReadyQueue::new();
    for (id, &count) in remaining.iter().enumerate() {
        if count == 0 {
            ready.push((), id);
        }
    }

    let (completions_tx, mut completions_rx) =
        mpsc::unbounded_channel::<(NodeId, anyhow::Result<T>)>();
    let mut outcomes: Vec<Option<anyhow::Result<T>>> = (0..total).map(|_| None).collect();
    let mut in_flight = 0usize;
    let mut terminal = 0usize;

    loop {
        while let Some(id) = ready.pop() {
            submit(id, &graph, &pool, &callback, &completions_tx)?;
            in_flight += 1;
        }

        if in_flight == 0 {
            break;
        }

        let Some((id, outcome)) = completions_rx.recv().await else {
            // Unreachable: this function holds the sender for the run's
            // whole lifetime.
            return Err(PgeError::Internal {
                message: format!("execution '{name}': completion channel closed prematurely"),
            });
        };
        in_flight -= 1;
        terminal += 1;

        if let Err(error) = &outcome {
            ItemFailed { name, error }.log();
        }
        outcomes[id] = Some(outcome);

        for &parent in graph.parents(id) {
            remaining[parent] -= 1;
            if remaining[parent] == 0 {
                ready.push((), parent);
            }
        }
    }

    if terminal < total {
        let stuck = total - terminal;
        ExecutionStuck { name, stuck, total }.log();
        return Err(PgeError::CycleDetected {
            name: name.to_string(),
            stuck,
            total,
        });
    }

    let mut results = std::collections::HashMap::with_capacity(total);
    let mut failed = 0usize;
    for (id, outcome) in outcomes.into_iter().enumerate() {
        let item = graph.item(id).clone();
        let item_result = match outcome.expect("every discovered node reached a terminal state") {
            Ok(value) => PgeItemResult::success(item.clone(), value),
            Err(error) => {
                failed += 1;
                PgeItemResult::failure(item.clone(), error)
            }
        };
        results.insert(item, item_result);
    }

    ExecutionCompleted {
        name,
        items: total,
        failed,
    }
    .log();
    Ok(PgeResult::new(results))
}

/// Hand one ready node to the pool. The callback is synchronous and may
/// block or burn CPU, so it runs on the runtime's blocking thread pool
/// rather than inline on a worker; a panicking item degrades into a
/// captured per-item failure instead of poisoning the run. A pool that no
/// longer accepts tasks fails the whole run structurally.
fn submit<N, T, F>(
    id: NodeId,
    graph: &Arc<PgeGraph<N>>,
    pool: &Arc<dyn TaskPool>,
    callback: &Arc<F>,
    completions: &mpsc::UnboundedSender<(NodeId, anyhow::Result<T>)>,
) -> Result<(), PgeError>
where
    N: Clone + Eq + Hash + Send + Sync + 'static,
    T: Send + 'static,
    F: Fn(&N) -> anyhow::Result<T> + Send + Sync + 'static,
{
    let graph = Arc::clone(graph);
    let callback = Arc::clone(callback);
    let completions = completions.clone();

    pool.spawn_task(Box::pin(async move {
        let handle = tokio::task::spawn_blocking(move || callback(graph.item(id)));
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join) => Err(join_failure(join)),
        };
        // The receiver disappears only if the run was abandoned; the
        // outcome has nowhere to go then.
        let _ = completions.send((id, outcome));
    }))
}

fn join_failure(error: JoinError) -> anyhow::Error {
    if error.is_panic() {
        anyhow!("item callback panicked: {}", panic_message(&*error.into_panic()))
    } else {
        anyhow!("item callback was cancelled before it could finish")
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
