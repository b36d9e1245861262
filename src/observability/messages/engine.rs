// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Message types for graph-run lifecycle events.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// A run started over a freshly discovered graph.
pub struct ExecutionStarted<'a> {
    pub name: &'a str,
    pub items: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution '{}' started: {} discovered items",
            self.name, self.items
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(name = self.name, items = self.items, "{}", self);
    }
}

/// Every discovered item reached a terminal state.
pub struct ExecutionCompleted<'a> {
    pub name: &'a str,
    pub items: usize,
    pub failed: usize,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution '{}' completed: {} items, {} failed",
            self.name, self.items, self.failed
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            name = self.name,
            items = self.items,
            failed = self.failed,
            "{}",
            self
        );
    }
}

/// The readiness process stalled; the remaining items form a cycle.
pub struct ExecutionStuck<'a> {
    pub name: &'a str,
    pub stuck: usize,
    pub total: usize,
}

impl Display for ExecutionStuck<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution '{}' stuck: {} of {} items can never become ready",
            self.name, self.stuck, self.total
        )
    }
}

impl StructuredLog for ExecutionStuck<'_> {
    fn log(&self) {
        tracing::error!(
            name = self.name,
            stuck = self.stuck,
            total = self.total,
            "{}",
            self
        );
    }
}

/// One item's callback failed; the run continues.
pub struct ItemFailed<'a> {
    pub name: &'a str,
    pub error: &'a anyhow::Error,
}

impl Display for ItemFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Execution '{}': item callback failed: {:#}",
            self.name, self.error
        )
    }
}

impl StructuredLog for ItemFailed<'_> {
    fn log(&self) {
        tracing::warn!(name = self.name, error = %self.error, "{}", self);
    }
}
