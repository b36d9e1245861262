// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

pub mod pool;

pub use pool::{TaskFuture, TaskPool};
