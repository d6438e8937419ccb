use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::geo::round2;

/// Edge within the routing graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: String,
    /// Great-circle distance in kilometres, rounded to two decimals.
    pub distance: f64,
}

/// Weighted adjacency graph used by the shortest-path engine.
///
/// Nodes and their edges are kept in name order so traversal, and therefore
/// tie-breaking between equal-cost paths, is deterministic. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: Arc<BTreeMap<String, Vec<Edge>>>,
}

impl Graph {
    /// Build a graph from `(from, to, weight)` triples.
    ///
    /// Weights must be finite and non-negative. Every endpoint becomes a node,
    /// even when it has no outgoing edges. Repeated `(from, to)` pairs
    /// collapse into one edge carrying the smallest weight.
    pub fn from_edges<I, S>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<String>,
    {
        let mut adjacency: BTreeMap<String, Vec<Edge>> = BTreeMap::new();
        for (from, to, weight) in edges {
            let from = from.into();
            let to = to.into();
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidEdgeWeight { from, to, weight });
            }
            adjacency.entry(to.clone()).or_default();
            let edges = adjacency.entry(from).or_default();
            match edges.iter_mut().find(|edge| edge.target == to) {
                Some(edge) => edge.distance = edge.distance.min(weight),
                None => edges.push(Edge {
                    target: to,
                    distance: weight,
                }),
            }
        }

        for edges in adjacency.values_mut() {
            edges.sort_by(|a, b| a.target.cmp(&b.target));
        }

        Ok(Self {
            adjacency: Arc::new(adjacency),
        })
    }

    /// Outgoing edges for `node`; empty when the node is unknown.
    pub fn neighbours(&self, node: &str) -> &[Edge] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Weight of the direct edge `from -> to`, if declared.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        self.neighbours(from)
            .iter()
            .find(|edge| edge.target == to)
            .map(|edge| edge.distance)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Node names in lexical order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

/// Build the routing graph for a dataset.
///
/// Each declared connection becomes a directed edge weighted by the
/// great-circle distance between its endpoints. Every registered location is
/// present as a node, even without connections.
pub fn build_graph(dataset: &Dataset) -> Result<Graph> {
    let registry = dataset.registry();
    let mut adjacency: BTreeMap<String, Vec<Edge>> = registry
        .names()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();

    for (from, targets) in dataset.connections() {
        let origin = registry
            .position(from)
            .ok_or_else(|| unknown_endpoint(from, targets.iter().next(), from))?;

        let edges = adjacency.entry(from.clone()).or_default();
        for to in targets {
            let destination = registry
                .position(to)
                .ok_or_else(|| unknown_endpoint(from, Some(to), to))?;
            edges.push(Edge {
                target: to.clone(),
                distance: round2(origin.distance_km(&destination)),
            });
        }
    }

    for (from, to) in dataset.one_way_connections() {
        warn!(from = %from, to = %to, "connection declared in one direction only");
    }

    let graph = Graph {
        adjacency: Arc::new(adjacency),
    };
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built routing graph"
    );
    Ok(graph)
}

fn unknown_endpoint(from: &str, to: Option<&String>, missing: &str) -> Error {
    Error::UnknownConnectivityLocation {
        from: from.to_string(),
        to: to.cloned().unwrap_or_default(),
        missing: missing.to_string(),
    }
}
