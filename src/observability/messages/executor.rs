// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Message types for worker-pool lifecycle events.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::observability::messages::StructuredLog;

/// A pool was built and (if monitored) registered.
pub struct PoolConstructed<'a> {
    pub description: &'a str,
    pub concurrency: usize,
}

impl Display for PoolConstructed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Constructed pool '{}' with concurrency {}",
            self.description, self.concurrency
        )
    }
}

impl StructuredLog for PoolConstructed<'_> {
    fn log(&self) {
        tracing::debug!(
            description = self.description,
            concurrency = self.concurrency,
            "{}",
            self
        );
    }
}

/// Shutdown of a pool began.
pub struct PoolClosing<'a> {
    pub description: &'a str,
    pub interrupt: bool,
}

impl Display for PoolClosing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutting down pool '{}' (interrupt: {})",
            self.description, self.interrupt
        )
    }
}

impl StructuredLog for PoolClosing<'_> {
    fn log(&self) {
        tracing::debug!(
            description = self.description,
            interrupt = self.interrupt,
            "{}",
            self
        );
    }
}

/// Shutdown of a pool finished (successfully or by timeout).
pub struct PoolClosed<'a> {
    pub description: &'a str,
    pub elapsed: Duration,
}

impl Display for PoolClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shut down pool '{}' in {:?}",
            self.description, self.elapsed
        )
    }
}

impl StructuredLog for PoolClosed<'_> {
    fn log(&self) {
        tracing::debug!(
            description = self.description,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "{}",
            self
        );
    }
}
