// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Execution-context propagation across the task boundary.
//!
//! Tasks run on freshly spawned workers, not on the submitter's thread, so
//! any ambient diagnostic context the submitter holds would normally be lost.
//! [`TaskContext::capture`] snapshots the submitter's current [`tracing`]
//! span at submission time; [`TaskContext::apply`] re-establishes it around
//! the task so log correlation (request ids, run names) survives the hop,
//! and drops it again when the task completes in any way.

use std::future::Future;

use tracing::instrument::{Instrument, Instrumented};
use tracing::Span;

/// Ambient context captured at task-submission time.
#[derive(Debug, Clone)]
pub struct TaskContext {
    span: Span,
}

impl TaskContext {
    /// Capture the submitter's current span.
    pub fn capture() -> Self {
        Self {
            span: Span::current(),
        }
    }

    /// Run the given future inside the captured context.
    pub fn apply<F: Future>(self, task: F) -> Instrumented<F> {
        task.instrument(self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn applied_future_still_yields_its_value() {
        let ctx = TaskContext::capture();
        let out = ctx.apply(async { 41 + 1 }).await;
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn captured_span_is_entered_inside_the_task() {
        // Spans are no-ops without a subscriber; install one for this thread.
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry());

        let span = tracing::info_span!("submission");
        let ctx = {
            let _guard = span.enter();
            TaskContext::capture()
        };

        // Outside the guard the ambient span is gone, but the captured one
        // must be current inside the task.
        let observed = ctx.apply(async { Span::current() }).await;
        assert_eq!(observed.id(), span.id());
    }
}
