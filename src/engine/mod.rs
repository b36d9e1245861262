// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

pub mod builder;
pub mod ready_queue;
pub mod result;
mod scheduler;

pub use builder::{ParallelGraphExecution, PgeBuilder, PgeItems};
pub use result::{PgeItemResult, PgeResult};
