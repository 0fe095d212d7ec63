//! Lineage graph model
//!
//! A directed multigraph keyed by table name. Every edge carries the
//! transformation id that produced its target from its source; the same
//! (source, target) pair may carry several edges with different ids.
//!
//! Ordering is stable everywhere: nodes are reported in first-seen order and
//! edges in insertion order. Traversals in [`crate::paths`] rely on this.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Borrowed view of one labelled edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineageEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub transformation_id: &'a str,
}

impl LineageEdge<'_> {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for LineageEdge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -[{}]-> {}",
            self.source, self.transformation_id, self.target
        )
    }
}

/// Directed multigraph of tables and transformations
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    graph: DiGraph<String, String>,
    node_index: HashMap<String, NodeIndex>,
}

impl LineageGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table if it is not present yet. Returns `true` when added.
    pub fn add_node(&mut self, name: &str) -> bool {
        if self.node_index.contains_key(name) {
            return false;
        }
        self.ensure_node(name);
        true
    }

    /// Insert a labelled edge, creating missing endpoints.
    ///
    /// A second edge between the same pair is kept as a parallel edge unless
    /// it carries the exact same transformation id. Returns `true` when a new
    /// edge was stored.
    pub fn add_edge(&mut self, source: &str, target: &str, transformation_id: &str) -> bool {
        let from = self.ensure_node(source);
        let to = self.ensure_node(target);

        let duplicate = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight() == transformation_id);
        if duplicate {
            return false;
        }

        self.graph.add_edge(from, to, transformation_id.to_string());
        true
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_index.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    // =========================================================================
    // QUERY ACCESSORS
    // =========================================================================

    /// All tables, first-seen order
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| self.graph[idx].as_str())
    }

    /// All edges, insertion order
    pub fn edges(&self) -> impl Iterator<Item = LineageEdge<'_>> + '_ {
        self.graph
            .edge_indices()
            .filter_map(move |id| self.edge_view(id))
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    /// Stored name of `name`, borrowed from the graph
    pub(crate) fn node_name(&self, name: &str) -> Option<&str> {
        self.node_index
            .get(name)
            .map(|idx| self.graph[*idx].as_str())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Distinct direct downstream tables of `node`.
    ///
    /// Unknown nodes have no successors.
    pub fn successors(&self, node: &str) -> Vec<&str> {
        dedupe_in_order(self.outgoing_edges(node).into_iter().map(|e| e.target))
    }

    /// Distinct direct upstream tables of `node`
    pub fn predecessors(&self, node: &str) -> Vec<&str> {
        dedupe_in_order(self.incoming_edges(node).into_iter().map(|e| e.source))
    }

    /// Edges leaving `node`, insertion order
    pub fn outgoing_edges(&self, node: &str) -> Vec<LineageEdge<'_>> {
        match self.node_index.get(node) {
            Some(idx) => self.directed_edges(*idx, Direction::Outgoing),
            None => Vec::new(),
        }
    }

    /// Edges entering `node`, insertion order
    pub fn incoming_edges(&self, node: &str) -> Vec<LineageEdge<'_>> {
        match self.node_index.get(node) {
            Some(idx) => self.directed_edges(*idx, Direction::Incoming),
            None => Vec::new(),
        }
    }

    /// Transformation ids of every edge from `source` to `target`, insertion order
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<&str> {
        let (Some(from), Some(to)) = (self.node_index.get(source), self.node_index.get(target))
        else {
            return Vec::new();
        };

        let mut ids: Vec<EdgeIndex> = self
            .graph
            .edges_connecting(*from, *to)
            .map(|e| e.id())
            .collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.graph.edge_weight(id).map(String::as_str))
            .collect()
    }

    /// Underlying petgraph storage, for renderers that speak petgraph
    pub fn as_petgraph(&self) -> &DiGraph<String, String> {
        &self.graph
    }

    fn directed_edges(&self, idx: NodeIndex, direction: Direction) -> Vec<LineageEdge<'_>> {
        let mut ids: Vec<EdgeIndex> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| e.id())
            .collect();
        ids.sort();
        ids.into_iter().filter_map(|id| self.edge_view(id)).collect()
    }

    fn edge_view(&self, id: EdgeIndex) -> Option<LineageEdge<'_>> {
        let (from, to) = self.graph.edge_endpoints(id)?;
        Some(LineageEdge {
            source: self.graph[from].as_str(),
            target: self.graph[to].as_str(),
            transformation_id: self.graph.edge_weight(id)?.as_str(),
        })
    }

    fn sorted_edges(&self) -> Vec<LineageEdge<'_>> {
        let mut edges: Vec<_> = self.edges().collect();
        edges.sort();
        edges
    }
}

fn dedupe_in_order<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names.filter(|name| seen.insert(*name)).collect()
}

/// Structural equality: same tables, same labelled edges, any insertion order
impl PartialEq for LineageGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        let nodes: BTreeSet<&str> = self.nodes().collect();
        let other_nodes: BTreeSet<&str> = other.nodes().collect();
        nodes == other_nodes && self.sorted_edges() == other.sorted_edges()
    }
}

impl Eq for LineageGraph {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LineageGraph {
        let mut graph = LineageGraph::new();
        graph.add_edge("a", "c", "t1");
        graph.add_edge("b", "c", "t1");
        graph.add_edge("c", "z", "t2");
        graph.add_edge("b", "c", "t3");
        graph
    }

    #[test]
    fn endpoints_become_nodes() {
        let graph = sample();
        let nodes: Vec<&str> = graph.nodes().collect();
        assert_eq!(nodes, vec!["a", "c", "b", "z"]);
        for edge in graph.edges() {
            assert!(graph.contains_node(edge.source));
            assert!(graph.contains_node(edge.target));
        }
    }

    #[test]
    fn parallel_edges_kept() {
        let graph = sample();
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.edges_between("b", "c"), vec!["t1", "t3"]);
        assert_eq!(graph.edges_between("a", "c"), vec!["t1"]);
        assert!(graph.edges_between("c", "a").is_empty());
        assert!(graph.edges_between("nope", "c").is_empty());
    }

    #[test]
    fn identical_triple_deduplicated() {
        let mut graph = sample();
        assert!(!graph.add_edge("b", "c", "t3"));
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.add_edge("b", "c", "t4"));
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn neighbours_are_distinct_and_ordered() {
        let graph = sample();
        assert_eq!(graph.predecessors("c"), vec!["a", "b"]);
        assert_eq!(graph.successors("b"), vec!["c"]);
        assert_eq!(graph.successors("c"), vec!["z"]);
        assert!(graph.successors("z").is_empty());
        assert!(graph.predecessors("unknown").is_empty());
    }

    #[test]
    fn outgoing_edges_follow_insertion_order() {
        let mut graph = LineageGraph::new();
        graph.add_edge("s", "x", "first");
        graph.add_edge("s", "y", "second");
        graph.add_edge("s", "x", "third");

        let ids: Vec<&str> = graph
            .outgoing_edges("s")
            .iter()
            .map(|e| e.transformation_id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);

        let incoming: Vec<String> = graph
            .incoming_edges("x")
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(incoming, vec!["s -[first]-> x", "s -[third]-> x"]);
    }

    #[test]
    fn self_loop_is_an_edge() {
        let mut graph = LineageGraph::new();
        graph.add_edge("c", "c", "tx");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.outgoing_edges("c")[0].is_self_loop());
        assert_eq!(graph.successors("c"), vec!["c"]);
    }

    #[test]
    fn structural_equality_ignores_insertion_order() {
        let mut reordered = LineageGraph::new();
        reordered.add_edge("b", "c", "t3");
        reordered.add_edge("c", "z", "t2");
        reordered.add_edge("b", "c", "t1");
        reordered.add_edge("a", "c", "t1");
        assert_eq!(sample(), reordered);

        reordered.add_edge("a", "c", "t9");
        assert_ne!(sample(), reordered);
    }

    #[test]
    fn isolated_node() {
        let mut graph = LineageGraph::new();
        assert!(graph.is_empty());
        assert!(graph.add_node("lonely"));
        assert!(!graph.add_node("lonely"));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
