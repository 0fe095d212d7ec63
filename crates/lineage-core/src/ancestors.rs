//! Ancestor extraction
//!
//! Finds every table that can reach a target and copies the induced
//! subgraph out of the full lineage graph. The copy owns its storage, so it
//! is independent of the graph it came from.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::error::LineageError;
use crate::graph::LineageGraph;
use crate::paths::{enumerate_transformation_paths, PathEnumeration, PathLimits};

/// Induced subgraph of a target and all of its ancestors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorSubgraph {
    target: String,
    ancestors: BTreeSet<String>,
    graph: LineageGraph,
}

impl AncestorSubgraph {
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Tables with a directed path to the target (target excluded)
    pub fn ancestors(&self) -> &BTreeSet<String> {
        &self.ancestors
    }

    pub fn graph(&self) -> &LineageGraph {
        &self.graph
    }

    pub fn into_graph(self) -> LineageGraph {
        self.graph
    }

    /// Enumerate transformation paths from every ancestor to the target
    pub fn enumerate_paths(&self, limits: &PathLimits) -> Result<PathEnumeration, LineageError> {
        enumerate_transformation_paths(&self.graph, &self.target, limits)
    }
}

/// Tables that have a directed path to `target`.
///
/// The target itself is never listed, even when it sits on a cycle.
pub fn ancestors(graph: &LineageGraph, target: &str) -> Result<BTreeSet<String>, LineageError> {
    let reached = reverse_reachable(graph, target)?;
    Ok(reached
        .into_iter()
        .filter(|name| *name != target)
        .map(str::to_string)
        .collect())
}

/// Copy out the subgraph induced by `target` and its ancestors.
///
/// A target without incoming edges yields a single-node graph.
pub fn extract_ancestors(
    graph: &LineageGraph,
    target: &str,
) -> Result<AncestorSubgraph, LineageError> {
    let keep = reverse_reachable(graph, target)?;

    let mut subgraph = LineageGraph::new();
    for node in graph.nodes().filter(|n| keep.contains(n)) {
        subgraph.add_node(node);
    }
    for edge in graph
        .edges()
        .filter(|e| keep.contains(e.source) && keep.contains(e.target))
    {
        subgraph.add_edge(edge.source, edge.target, edge.transformation_id);
    }

    let ancestors: BTreeSet<String> = keep
        .iter()
        .filter(|name| **name != target)
        .map(|name| name.to_string())
        .collect();

    debug!(
        target,
        ancestors = ancestors.len(),
        edges = subgraph.edge_count(),
        "ancestor subgraph extracted"
    );

    Ok(AncestorSubgraph {
        target: target.to_string(),
        ancestors,
        graph: subgraph,
    })
}

/// BFS over predecessor edges starting at `target`. Includes `target`.
pub(crate) fn reverse_reachable<'g>(
    graph: &'g LineageGraph,
    target: &str,
) -> Result<HashSet<&'g str>, LineageError> {
    let start = graph
        .node_name(target)
        .ok_or_else(|| LineageError::unknown_target(target))?;

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for pred in graph.predecessors(current) {
            if visited.insert(pred) {
                queue.push_back(pred);
            }
        }
    }

    Ok(visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetadataRecord;

    fn scenario() -> LineageGraph {
        LineageGraph::from_records(&[
            MetadataRecord::new(["a", "b"], "c", "t1"),
            MetadataRecord::new(["c"], "z", "t2"),
            MetadataRecord::new(["b"], "c", "t3"),
        ])
        .unwrap()
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn scenario_keeps_every_node() {
        let graph = scenario();
        let sub = extract_ancestors(&graph, "z").unwrap();
        assert_eq!(sub.target(), "z");
        assert_eq!(names(sub.ancestors()), vec!["a", "b", "c"]);
        assert_eq!(sub.graph(), &graph);
    }

    #[test]
    fn unrelated_and_downstream_tables_are_dropped() {
        let mut graph = scenario();
        graph.add_edge("z", "report", "t4");
        graph.add_edge("other", "elsewhere", "t5");
        graph.add_edge("a", "side", "t6");

        let sub = extract_ancestors(&graph, "c").unwrap();
        let nodes: Vec<&str> = sub.graph().nodes().collect();
        assert_eq!(nodes, vec!["a", "c", "b"]);
        assert_eq!(sub.graph().edge_count(), 3);
        assert!(!sub.graph().contains_node("side"));
        assert!(!sub.graph().contains_node("z"));
    }

    #[test]
    fn target_without_predecessors_is_alone() {
        let graph = scenario();
        let sub = extract_ancestors(&graph, "a").unwrap();
        assert!(sub.ancestors().is_empty());
        assert_eq!(sub.graph().nodes().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(sub.graph().edge_count(), 0);
    }

    #[test]
    fn unknown_target_is_an_error() {
        let err = extract_ancestors(&scenario(), "missing").unwrap_err();
        assert_eq!(
            err,
            LineageError::UnknownTarget {
                target: "missing".into()
            }
        );
        assert!(ancestors(&scenario(), "missing").is_err());
    }

    #[test]
    fn cycles_terminate() {
        let mut graph = LineageGraph::new();
        // cycle among ancestors
        graph.add_edge("p", "q", "t1");
        graph.add_edge("q", "p", "t2");
        graph.add_edge("q", "z", "t3");
        // cycle through the target
        graph.add_edge("z", "p", "t4");
        // cycle unrelated to the target
        graph.add_edge("m", "n", "t5");
        graph.add_edge("n", "m", "t6");

        let found = ancestors(&graph, "z").unwrap();
        assert_eq!(names(&found), vec!["p", "q"]);

        let sub = extract_ancestors(&graph, "z").unwrap();
        assert_eq!(sub.graph().edge_count(), 4);
        assert!(!sub.graph().contains_node("m"));
    }

    #[test]
    fn subgraph_is_an_independent_copy() {
        let mut graph = scenario();
        let sub = extract_ancestors(&graph, "z").unwrap();
        graph.add_edge("new", "z", "t9");
        assert!(!sub.graph().contains_node("new"));
        assert_eq!(sub.graph().edge_count(), 4);
    }
}
