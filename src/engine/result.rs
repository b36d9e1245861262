// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Aggregate and per-item outcome records returned by a run.

use std::collections::HashMap;
use std::hash::Hash;

/// Outcome of processing a single item: exactly one of value or error.
///
/// An error here means the user callback failed (returned `Err` or panicked)
/// for this particular item; it never reflects failures of other items.
pub struct PgeItemResult<N, T> {
    item: N,
    value: Option<T>,
    error: Option<anyhow::Error>,
}

impl<N, T> PgeItemResult<N, T> {
    pub(crate) fn success(item: N, value: T) -> Self {
        Self {
            item,
            value: Some(value),
            error: None,
        }
    }

    pub(crate) fn failure(item: N, error: anyhow::Error) -> Self {
        Self {
            item,
            value: None,
            error: Some(error),
        }
    }

    pub fn item(&self) -> &N {
        &self.item
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

/// Result of a whole run: one entry per discovered item.
///
/// Frozen once `run()` returns; a caller either gets this complete mapping
/// (possibly with per-item errors) or a structural [`crate::PgeError`],
/// never a silent partial result.
pub struct PgeResult<N, T> {
    results: HashMap<N, PgeItemResult<N, T>>,
}

impl<N, T> PgeResult<N, T>
where
    N: Eq + Hash,
{
    pub(crate) fn new(results: HashMap<N, PgeItemResult<N, T>>) -> Self {
        Self { results }
    }

    /// True iff at least one item's callback failed.
    pub fn has_error(&self) -> bool {
        self.results.values().any(PgeItemResult::is_failed)
    }

    pub fn item_results(&self) -> &HashMap<N, PgeItemResult<N, T>> {
        &self.results
    }

    pub fn into_item_results(self) -> HashMap<N, PgeItemResult<N, T>> {
        self.results
    }

    pub fn get(&self, item: &N) -> Option<&PgeItemResult<N, T>> {
        self.results.get(item)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn item_result_holds_exactly_one_side() {
        let ok: PgeItemResult<&str, i32> = PgeItemResult::success("a", 1);
        assert_eq!(ok.value(), Some(&1));
        assert!(ok.error().is_none());
        assert!(!ok.is_failed());

        let failed: PgeItemResult<&str, i32> = PgeItemResult::failure("b", anyhow!("boom"));
        assert!(failed.value().is_none());
        assert!(failed.is_failed());
        assert_eq!(failed.item(), &"b");
    }

    #[test]
    fn has_error_is_derived_from_item_results() {
        let mut map = HashMap::new();
        map.insert("a", PgeItemResult::success("a", 1));
        map.insert("b", PgeItemResult::success("b", 2));
        let result = PgeResult::new(map);
        assert!(!result.has_error());

        let mut map = HashMap::new();
        map.insert("a", PgeItemResult::success("a", 1));
        map.insert("b", PgeItemResult::<&str, i32>::failure("b", anyhow!("boom")));
        let result = PgeResult::new(map);
        assert!(result.has_error());
        assert!(result.get(&"b").unwrap().is_failed());
    }
}
