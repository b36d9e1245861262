// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

use std::time::Duration;

/// Structural errors raised by graph execution and the bounded executor.
///
/// Item-level callback failures are *not* represented here: they are captured
/// into the per-item result map (`PgeItemResult::error`) and never abort a
/// run. This enum covers the cases where the request itself is unexecutable
/// or the worker pool misbehaves, which are surfaced as a hard error from
/// `run()` / `build()` / `close()` instead of being folded into results.
#[derive(Debug, thiserror::Error)]
pub enum PgeError {
    /// The readiness process stalled: nothing is running, nothing is ready,
    /// yet some nodes still wait on unfinished dependencies. Those nodes form
    /// at least one cycle.
    #[error("execution '{name}': cycle detected, {stuck} of {total} items can never become ready")]
    CycleDetected {
        /// Name the run was given via `foreach`.
        name: String,
        /// Number of items whose dependency counter never reached zero.
        stuck: usize,
        /// Total number of discovered items.
        total: usize,
    },

    /// A required builder parameter is missing or out of range. Raised before
    /// any graph traversal starts.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A task was handed to a pool whose shutdown already began. Submissions
    /// are rejected eagerly; silently dropping them would leave submitters
    /// waiting for completions that can never arrive.
    #[error("pool '{description}' is shut down and no longer accepts tasks")]
    PoolShutDown { description: String },

    /// Waiting for worker-pool termination exceeded the configured timeout.
    /// In-flight tasks keep running; the pool is unregistered regardless.
    #[error("pool '{description}' did not terminate within {timeout:?}")]
    PoolTerminationElapsed {
        description: String,
        timeout: Duration,
    },

    /// Bookkeeping invariant violated; indicates a bug in the engine itself.
    #[error("internal error: {message}")]
    Internal { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_names_run_and_counts_stuck_items() {
        let err = PgeError::CycleDetected {
            name: "nightly-build".into(),
            stuck: 2,
            total: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("nightly-build"));
        assert!(msg.contains("2 of 7"));
    }

    #[test]
    fn configuration_error_carries_message() {
        let err = PgeError::InvalidConfiguration {
            message: "concurrency must be at least 1".into(),
        };
        assert!(err.to_string().contains("concurrency must be at least 1"));
    }
}
