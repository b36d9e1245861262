// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Structured logging for engine and executor events.
//!
//! Diagnostic output goes through typed message structs instead of magic
//! strings scattered around the codebase. Each message implements `Display`
//! for a human-readable line and [`messages::StructuredLog`] to emit itself
//! as a `tracing` event with structured fields.
//!
//! Messages are organized by subsystem:
//! * [`messages::engine`]: run lifecycle (start, completion, stuck, item failures)
//! * [`messages::executor`]: pool lifecycle (construction, shutdown)
//!
//! The crate never installs a subscriber on its own; embedders wire up their
//! own `tracing` stack, or call [`init_tracing`] for a sensible default.

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a formatted `tracing` subscriber filtered by `RUST_LOG`
/// (defaulting to `info`). Intended for binaries and examples; a no-op if a
/// global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
