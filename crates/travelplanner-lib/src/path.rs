//! Dijkstra search over the routing graph.
//!
//! One search routine serves both the single shortest path and the bounded
//! list of alternatives; [`SearchMode`] selects when it stops.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;
use tracing::trace;

use crate::graph::Graph;

/// Cost and node sequence of a path found by the search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    /// Sum of edge weights, `f64::INFINITY` when unreachable.
    pub cost: f64,
    /// Node names from source to destination, empty when unreachable.
    pub path: Vec<String>,
}

impl PathResult {
    /// Result returned when the destination cannot be reached.
    pub fn unreachable() -> Self {
        Self {
            cost: f64::INFINITY,
            path: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.cost.is_finite() && !self.path.is_empty()
    }

    /// Number of edges in the path.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// When the search stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Stop at the first time the destination is popped.
    FirstArrival,
    /// Keep searching after reaching the destination, yielding one path per
    /// pop of the destination until `max_count` paths were found.
    Alternatives { max_count: usize },
}

impl SearchMode {
    fn limit(self) -> usize {
        match self {
            SearchMode::FirstArrival => 1,
            SearchMode::Alternatives { max_count } => max_count,
        }
    }
}

/// Lowest-cost path from `source` to `destination`.
///
/// Returns [`PathResult::unreachable`] when no path exists or either name is
/// not a node of the graph.
pub fn shortest_path(graph: &Graph, source: &str, destination: &str) -> PathResult {
    search(graph, source, destination, SearchMode::FirstArrival)
        .into_iter()
        .next()
        .unwrap_or_else(PathResult::unreachable)
}

/// Up to `max_count` distinct paths in increasing cost order.
///
/// Every node except the destination is finalized the first time it is
/// popped, so a path that would pass through an already-finalized node is
/// never produced. The result is therefore an approximation of the k
/// shortest simple paths: paths never repeat a node and the first entry is
/// always the shortest path, but alternatives sharing a prefix with an
/// earlier path can be missed.
pub fn k_shortest_distinct_paths(
    graph: &Graph,
    source: &str,
    destination: &str,
    max_count: usize,
) -> Vec<PathResult> {
    search(
        graph,
        source,
        destination,
        SearchMode::Alternatives { max_count },
    )
}

/// Run the search in the given mode.
///
/// Equal-cost queue entries are ordered by node name and then by discovery
/// order, so identical queries always return identical paths.
pub fn search<'a>(
    graph: &'a Graph,
    source: &'a str,
    destination: &str,
    mode: SearchMode,
) -> Vec<PathResult> {
    let limit = mode.limit();
    if limit == 0 || !graph.contains(source) || !graph.contains(destination) {
        return Vec::new();
    }

    let prune = mode == SearchMode::FirstArrival;
    let mut labels = vec![Label {
        node: source,
        parent: None,
    }];
    let mut finalized: HashSet<&str> = HashSet::new();
    let mut best: HashMap<&str, f64> = HashMap::from([(source, 0.0)]);
    let mut queue = BinaryHeap::from([QueueEntry::new(source, 0.0, 0)]);
    let mut results = Vec::new();

    while let Some(entry) = queue.pop() {
        if entry.node == destination {
            results.push(PathResult {
                cost: entry.cost.0,
                path: reconstruct_path(&labels, entry.label),
            });
            if results.len() >= limit {
                break;
            }
            continue;
        }

        if !finalized.insert(entry.node) {
            continue;
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target.as_str();
            if finalized.contains(next) {
                continue;
            }

            let next_cost = entry.cost.0 + edge.distance;
            if prune {
                if next_cost >= *best.get(next).unwrap_or(&f64::INFINITY) {
                    continue;
                }
                best.insert(next, next_cost);
            }

            labels.push(Label {
                node: next,
                parent: Some(entry.label),
            });
            queue.push(QueueEntry::new(next, next_cost, labels.len() - 1));
        }
    }

    trace!(
        source,
        destination,
        found = results.len(),
        explored = finalized.len(),
        "search finished"
    );
    results
}

/// Total weight of `path` following declared edges, or `None` if some
/// consecutive pair is not connected.
pub fn path_weight(graph: &Graph, path: &[String]) -> Option<f64> {
    path.windows(2)
        .map(|pair| graph.edge_weight(&pair[0], &pair[1]))
        .sum()
}

/// Search tree node: one discovered way of reaching `node`.
#[derive(Debug, Clone, Copy)]
struct Label<'a> {
    node: &'a str,
    parent: Option<usize>,
}

fn reconstruct_path(labels: &[Label<'_>], leaf: usize) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = Some(leaf);
    while let Some(index) = current {
        let label = labels[index];
        path.push(label.node.to_string());
        current = label.parent;
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry<'a> {
    cost: FloatOrd,
    node: &'a str,
    label: usize,
}

impl<'a> QueueEntry<'a> {
    fn new(node: &'a str, cost: f64, label: usize) -> Self {
        Self {
            cost: FloatOrd(cost),
            node,
            label,
        }
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
            .then_with(|| other.label.cmp(&self.label))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    fn diamond() -> Graph {
        Graph::from_edges([
            ("A", "B", 2.0),
            ("A", "C", 5.0),
            ("B", "A", 2.0),
            ("B", "C", 1.0),
            ("B", "D", 4.0),
            ("C", "A", 5.0),
            ("C", "B", 1.0),
            ("C", "D", 1.0),
            ("D", "B", 4.0),
            ("D", "C", 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn finds_cheapest_path() {
        let result = shortest_path(&diamond(), "A", "D");
        assert_eq!(result.cost, 4.0);
        assert_eq!(result.path, names(&["A", "B", "C", "D"]));
        assert_eq!(result.hop_count(), 3);
    }

    #[test]
    fn same_source_and_destination() {
        let result = shortest_path(&diamond(), "C", "C");
        assert_eq!(result.cost, 0.0);
        assert_eq!(result.path, names(&["C"]));
    }

    #[test]
    fn unknown_nodes_are_unreachable() {
        let result = shortest_path(&diamond(), "A", "Z");
        assert!(result.cost.is_infinite());
        assert!(result.path.is_empty());
        assert!(!result.is_reachable());
    }

    #[test]
    fn ties_break_on_node_name() {
        // Two equal-cost routes A-B-D and A-C-D; B sorts first.
        let graph = Graph::from_edges([
            ("A", "C", 1.0),
            ("A", "B", 1.0),
            ("B", "D", 1.0),
            ("C", "D", 1.0),
        ])
        .unwrap();
        for _ in 0..5 {
            assert_eq!(shortest_path(&graph, "A", "D").path, names(&["A", "B", "D"]));
        }
    }

    #[test]
    fn self_loops_and_zero_weights_terminate() {
        let graph = Graph::from_edges([
            ("A", "A", 0.0),
            ("A", "B", 0.0),
            ("B", "A", 0.0),
            ("B", "B", 0.0),
            ("B", "C", 3.0),
        ])
        .unwrap();
        let result = shortest_path(&graph, "A", "C");
        assert_eq!(result.cost, 3.0);
        assert_eq!(result.path, names(&["A", "B", "C"]));
    }

    #[test]
    fn alternatives_are_ordered_by_cost() {
        let results = k_shortest_distinct_paths(&diamond(), "A", "D", 3);
        assert!(!results.is_empty());
        assert!(results.len() <= 3);
        assert_eq!(results[0].cost, 4.0);
        for pair in results.windows(2) {
            assert!(pair[0].cost <= pair[1].cost);
        }
        for result in &results {
            let unique: HashSet<_> = result.path.iter().collect();
            assert_eq!(unique.len(), result.path.len(), "no repeated nodes");
            assert_eq!(result.path.first().map(String::as_str), Some("A"));
            assert_eq!(result.path.last().map(String::as_str), Some("D"));
        }
    }

    #[test]
    fn alternatives_with_zero_count_are_empty() {
        assert!(k_shortest_distinct_paths(&diamond(), "A", "D", 0).is_empty());
    }

    #[test]
    fn path_weight_sums_edges() {
        let graph = diamond();
        assert_eq!(path_weight(&graph, &names(&["A", "B", "C", "D"])), Some(4.0));
        assert_eq!(path_weight(&graph, &names(&["A", "D"])), None);
        assert_eq!(path_weight(&graph, &names(&["A"])), Some(0.0));
    }
}
