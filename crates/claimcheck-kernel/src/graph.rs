//! Claim dependency graphs.
//!
//! An edge `source -> target` reads "source depends on / implies target".
//! Edges are a set: listing the same pair twice has no extra meaning.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// One row of a tabular edge source.
///
/// `reference` is `None` when the table has no reference column and
/// `Some("")` when the column exists but the cell is blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRow {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl EdgeRow {
    pub fn edge(&self) -> Edge {
        Edge::new(self.from.clone(), self.to.clone())
    }
}

/// Node set plus deduplicated edge set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeSet<String>,
    edges: BTreeSet<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Declare a standalone node. Returns false if it was already present.
    pub fn add_node(&mut self, id: impl Into<String>) -> bool {
        self.nodes.insert(id.into())
    }

    /// Add an edge, declaring both endpoints. Returns false for a duplicate.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        self.nodes.insert(edge.source.clone());
        self.nodes.insert(edge.target.clone());
        self.edges.insert(edge)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in lexicographic order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Edges ordered by (source, target).
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Successor lists for every node, including nodes without out-edges.
    pub fn adjacency(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut adjacency: BTreeMap<&str, Vec<&str>> =
            self.nodes.iter().map(|node| (node.as_str(), Vec::new())).collect();
        for edge in &self.edges {
            adjacency
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_edges_collapse() {
        let mut graph = Graph::new();
        assert!(graph.add_edge(Edge::new("A", "B")));
        assert!(!graph.add_edge(Edge::new("A", "B")));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn standalone_nodes_are_kept() {
        let mut graph = Graph::from_edges([Edge::new("A", "B")]);
        graph.add_node("C");
        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(graph.adjacency().get("C"), Some(&Vec::new()));
    }
}
