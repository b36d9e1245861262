// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.

use std::fmt::Display;

pub mod engine;
pub mod executor;

/// A loggable event: human-readable via `Display`, structured via `log`.
pub trait StructuredLog: Display {
    /// Emit this message as a `tracing` event with structured fields at the
    /// level appropriate for the event.
    fn log(&self);
}
