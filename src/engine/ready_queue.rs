// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Priority queue with FIFO tie-break.
//!
//! `std::collections::BinaryHeap` gives no ordering guarantee between equal
//! entries, which would make submission order of simultaneously ready nodes
//! arbitrary. [`ReadyQueue`] attaches a monotonically increasing sequence
//! number to every pushed entry and compares `(priority, sequence)`
//! lexicographically: higher priority pops first, and among equal priorities
//! the entry pushed first pops first. This keeps scheduling deterministic and
//! starvation-free for graphs where all ready nodes rank equal.
//!
//! ```
//! use pge::engine::ready_queue::ReadyQueue;
//!
//! let mut queue = ReadyQueue::new();
//! queue.push(1, "low-a");
//! queue.push(2, "high");
//! queue.push(1, "low-b");
//!
//! assert_eq!(queue.pop(), Some("high"));
//! // Equal priorities come out in push order.
//! assert_eq!(queue.pop(), Some("low-a"));
//! assert_eq!(queue.pop(), Some("low-b"));
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<P, V> {
    priority: P,
    seq: u64,
    value: V,
}

impl<P: Ord, V> PartialEq for Entry<P, V> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<P: Ord, V> Eq for Entry<P, V> {}

impl<P: Ord, V> PartialOrd for Entry<P, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Ord, V> Ord for Entry<P, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority wins; among equals the *older* sequence
        // number must be the greater heap entry to pop first.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Max-priority queue preserving insertion order among equal priorities.
pub struct ReadyQueue<P: Ord, V> {
    heap: BinaryHeap<Entry<P, V>>,
    next_seq: u64,
}

impl<P: Ord, V> ReadyQueue<P, V> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, priority: P, value: V) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            value,
        });
    }

    pub fn pop(&mut self) -> Option<V> {
        self.heap.pop().map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<P: Ord, V> Default for ReadyQueue<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_priorities_pop_in_push_order() {
        let mut queue = ReadyQueue::new();
        for i in 0..100 {
            queue.push((), i);
        }
        for i in 0..100 {
            assert_eq!(queue.pop(), Some(i));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn higher_priority_pops_first() {
        let mut queue = ReadyQueue::new();
        queue.push(0, "low");
        queue.push(5, "high");
        queue.push(3, "mid");

        assert_eq!(queue.pop(), Some("high"));
        assert_eq!(queue.pop(), Some("mid"));
        assert_eq!(queue.pop(), Some("low"));
    }

    #[test]
    fn fifo_survives_interleaved_push_and_pop() {
        let mut queue = ReadyQueue::new();
        queue.push((), "a");
        queue.push((), "b");
        assert_eq!(queue.pop(), Some("a"));
        queue.push((), "c");
        assert_eq!(queue.pop(), Some("b"));
        assert_eq!(queue.pop(), Some("c"));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn len_tracks_contents() {
        let mut queue = ReadyQueue::new();
        assert_eq!(queue.len(), 0);
        queue.push((), 1);
        queue.push((), 2);
        assert_eq!(queue.len(), 2);
        queue.pop();
        assert_eq!(queue.len(), 1);
    }
}
