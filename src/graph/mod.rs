// Copyright (c) 2026 the pge authors
// SPDX-License-Identifier: MIT

//! Lazily discovered dependency graph.
//!
//! A [`PgeGraph`] is built once per run from a set of root items and a
//! caller-supplied resolver, and is immutable afterwards. Nodes live in an
//! index-addressed arena (`Vec<PgeNode<N>>`) and reference each other through
//! integer [`NodeId`] handles, which keeps traversal deterministic and makes
//! cycle reporting cheap even though a cyclic input graph is representable.
//!
//! Only depender ("parent") edges are stored per node. The number of distinct
//! dependencies of each node is counted once during the construction pass and
//! kept as `child_count`; the scheduler copies those counts into its live
//! readiness counters, so no reverse adjacency is ever materialized.
//!
//! Two construction strategies exist, converging on the same internal shape
//! (`child.parents += parent`, i.e. "parent may not start until child
//! finishes"):
//!
//! * [`PgeGraph::for_child_resolver`]: roots are top-level items, the
//!   resolver yields what each item depends on (must finish first).
//! * [`PgeGraph::for_parent_resolver`]: roots are leaf items, the resolver
//!   yields what may only run after each item.
//!
//! Items are deduplicated by their `Eq`/`Hash` identity: no matter how many
//! traversal paths (or duplicated resolver entries) reach an item, it becomes
//! exactly one node, and multi-edges collapse into one logical edge.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Arena handle of a node inside a [`PgeGraph`].
pub(crate) type NodeId = usize;

/// Direction the resolver walks the graph in.
enum ResolveDirection {
    /// Resolver yields dependencies of an item (processed first).
    Children,
    /// Resolver yields dependers of an item (processed after).
    Parents,
}

/// Node record: the wrapped item plus its depender edges.
struct PgeNode<N> {
    item: N,
    /// Nodes that may only start once this node finished, in edge discovery
    /// order, duplicates collapsed.
    parents: Vec<NodeId>,
    /// Number of distinct nodes that must finish before this one may start.
    child_count: usize,
}

impl<N> PgeNode<N> {
    fn new(item: N) -> Self {
        Self {
            item,
            parents: Vec::new(),
            child_count: 0,
        }
    }
}

/// The full discovered set of nodes for one run.
pub struct PgeGraph<N> {
    nodes: Vec<PgeNode<N>>,
}

impl<N> PgeGraph<N>
where
    N: Clone + Eq + Hash,
{
    /// Build a graph from items whose *dependencies* are resolved: for every
    /// item the resolver returns the items that must finish first.
    pub fn for_child_resolver<R, I>(roots: impl IntoIterator<Item = N>, resolver: R) -> Self
    where
        R: FnMut(&N) -> I,
        I: IntoIterator<Item = N>,
    {
        Self::discover(roots, resolver, ResolveDirection::Children)
    }

    /// Build a graph from items whose *dependers* are resolved: for every
    /// item the resolver returns the items that may only run after it.
    pub fn for_parent_resolver<R, I>(roots: impl IntoIterator<Item = N>, resolver: R) -> Self
    where
        R: FnMut(&N) -> I,
        I: IntoIterator<Item = N>,
    {
        Self::discover(roots, resolver, ResolveDirection::Parents)
    }

    /// BFS outward from the roots, interning every item exactly once and
    /// collapsing redundant edges through an edge-seen set.
    fn discover<R, I>(
        roots: impl IntoIterator<Item = N>,
        mut resolver: R,
        direction: ResolveDirection,
    ) -> Self
    where
        R: FnMut(&N) -> I,
        I: IntoIterator<Item = N>,
    {
        let mut nodes: Vec<PgeNode<N>> = Vec::new();
        let mut index: HashMap<N, NodeId> = HashMap::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        // (child, parent) pairs already recorded, for multi-edge collapsing.
        let mut seen_edges: HashSet<(NodeId, NodeId)> = HashSet::new();

        let mut intern = |item: N,
                          nodes: &mut Vec<PgeNode<N>>,
                          queue: &mut VecDeque<NodeId>|
         -> NodeId {
            match index.get(&item) {
                Some(&id) => id,
                None => {
                    let id = nodes.len();
                    index.insert(item.clone(), id);
                    nodes.push(PgeNode::new(item));
                    queue.push_back(id);
                    id
                }
            }
        };

        for root in roots {
            intern(root, &mut nodes, &mut queue);
        }

        while let Some(current) = queue.pop_front() {
            // The resolver may recursively hand back items we are mid-way
            // through inserting, so it only ever sees a clone.
            let item = nodes[current].item.clone();
            for resolved in resolver(&item) {
                let other = intern(resolved, &mut nodes, &mut queue);
                let (child, parent) = match direction {
                    ResolveDirection::Children => (other, current),
                    ResolveDirection::Parents => (current, other),
                };
                if seen_edges.insert((child, parent)) {
                    nodes[child].parents.push(parent);
                    nodes[parent].child_count += 1;
                }
            }
        }

        Self { nodes }
    }
}

impl<N> PgeGraph<N> {
    /// Number of discovered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Item wrapped by the given node.
    pub(crate) fn item(&self, id: NodeId) -> &N {
        &self.nodes[id].item
    }

    /// Dependers of the given node, in edge discovery order.
    pub(crate) fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].parents
    }

    /// Number of distinct dependencies of the given node.
    pub(crate) fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id].child_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children_of(map: &HashMap<&'static str, Vec<&'static str>>, n: &&'static str) -> Vec<&'static str> {
        map.get(n).cloned().unwrap_or_default()
    }

    fn diamond() -> HashMap<&'static str, Vec<&'static str>> {
        // top depends on left and right, both depend on bottom
        HashMap::from([
            ("top", vec!["left", "right"]),
            ("left", vec!["bottom"]),
            ("right", vec!["bottom"]),
        ])
    }

    #[test]
    fn diamond_is_discovered_once_per_item() {
        let map = diamond();
        let graph = PgeGraph::for_child_resolver(["top"], |n| children_of(&map, n));

        // "bottom" is reachable through two paths but becomes one node.
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn child_counts_reflect_distinct_dependencies() {
        let map = diamond();
        let graph = PgeGraph::for_child_resolver(["top"], |n| children_of(&map, n));

        let count_of = |name: &str| {
            (0..graph.len())
                .find(|&id| *graph.item(id) == name)
                .map(|id| graph.child_count(id))
                .unwrap()
        };
        assert_eq!(count_of("top"), 2);
        assert_eq!(count_of("left"), 1);
        assert_eq!(count_of("right"), 1);
        assert_eq!(count_of("bottom"), 0);
    }

    #[test]
    fn multi_edges_collapse_to_one() {
        // Resolver hands back the same dependency five times.
        let graph = PgeGraph::for_child_resolver(["a"], |n: &&str| {
            if *n == "a" {
                vec!["b"; 5]
            } else {
                vec![]
            }
        });

        assert_eq!(graph.len(), 2);
        let a = (0..graph.len()).find(|&id| *graph.item(id) == "a").unwrap();
        let b = (0..graph.len()).find(|&id| *graph.item(id) == "b").unwrap();
        assert_eq!(graph.child_count(a), 1);
        assert_eq!(graph.parents(b), &[a]);
    }

    #[test]
    fn parent_resolver_builds_the_same_edges() {
        // Same diamond expressed from the bottom via depender resolution.
        let parents_map: HashMap<&'static str, Vec<&'static str>> = HashMap::from([
            ("bottom", vec!["left", "right"]),
            ("left", vec!["top"]),
            ("right", vec!["top"]),
        ]);
        let graph =
            PgeGraph::for_parent_resolver(["bottom"], |n| children_of(&parents_map, n));

        assert_eq!(graph.len(), 4);
        let id_of = |name: &str| (0..graph.len()).find(|&id| *graph.item(id) == name).unwrap();
        assert_eq!(graph.child_count(id_of("top")), 2);
        assert_eq!(graph.child_count(id_of("bottom")), 0);
        assert_eq!(graph.parents(id_of("bottom")).len(), 2);
    }

    #[test]
    fn duplicate_roots_are_interned_once() {
        let graph = PgeGraph::for_child_resolver(["a", "a", "a"], |_n: &&str| Vec::<&str>::new());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn cyclic_input_is_representable() {
        // a <-> b: construction must terminate, detection is the scheduler's job.
        let graph = PgeGraph::for_child_resolver(["a"], |n: &&str| {
            if *n == "a" {
                vec!["b"]
            } else {
                vec!["a"]
            }
        });
        assert_eq!(graph.len(), 2);
        assert!((0..graph.len()).all(|id| graph.child_count(id) == 1));
    }
}
