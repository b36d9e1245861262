// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

mod execution;

pub use execution::PgeError;
