//! Transformation path enumeration
//!
//! Walks forward from the origin tables of a target's lineage and records,
//! for every walk that arrives at the target, the distinct transformation
//! ids met along the way in first-encountered order.
//!
//! # Walk rules
//!
//! - Walks start at origin ancestors: ancestors that no other ancestor feeds,
//!   except from inside their own cycle. When every ancestor sits on a cycle
//!   the whole source cycle is used as the starting set.
//! - Outgoing edges are taken in edge insertion order.
//! - A node already on the current walk is not entered again; the branch
//!   ends without output. Sibling branches keep their own visited sets.
//! - Entering a table absorbs the ids of its self-loop edges before the walk
//!   moves on. The target's own self-loops are ignored: arriving ends the walk.
//! - An id already in the sequence is not appended again.
//!
//! # Cost
//!
//! Enumeration is exponential in the number of simple paths of a densely
//! connected lineage. [`PathLimits`] caps the number of distinct sequences
//! and the number of hops per walk; both are checked at every frontier
//! expansion of the explicit DFS stack.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::debug;

use crate::ancestors::reverse_reachable;
use crate::error::{LineageError, PathLimit};
use crate::graph::LineageGraph;

/// Ordered, duplicate-free sequence of transformation ids
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TransformationPath(Vec<String>);

impl TransformationPath {
    /// Build a path from ids, dropping repeats after their first occurrence
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Self(Vec::new());
        for id in ids {
            path.push_distinct(&id.into());
        }
        path
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    fn push_distinct(&mut self, id: &str) {
        if !self.contains(id) {
            self.0.push(id.to_string());
        }
    }
}

impl fmt::Display for TransformationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" -> "))
    }
}

/// Behaviour when a limit is hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LimitPolicy {
    /// Return `PathLimitExceeded`, discarding everything found so far
    #[default]
    Fail,
    /// Stop at the limit and return the partial result flagged as truncated
    Truncate,
}

/// Caller-imposed enumeration budget. Unbounded by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathLimits {
    pub max_paths: Option<usize>,
    pub max_depth: Option<usize>,
    pub on_limit: LimitPolicy,
}

impl PathLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_paths(mut self, max: usize) -> Self {
        self.max_paths = Some(max);
        self
    }

    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = Some(max);
        self
    }

    /// Opt into partial results instead of an error
    pub fn allow_partial(mut self) -> Self {
        self.on_limit = LimitPolicy::Truncate;
        self
    }
}

/// Output of an enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathEnumeration {
    pub paths: BTreeSet<TransformationPath>,
    /// Set only under [`LimitPolicy::Truncate`] when a limit cut the search short
    pub truncated: bool,
    /// Frontier states expanded, for diagnostics
    pub walks_expanded: usize,
}

impl PathEnumeration {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformationPath> {
        self.paths.iter()
    }

    pub fn contains(&self, path: &TransformationPath) -> bool {
        self.paths.contains(path)
    }
}

/// One pending state of the explicit DFS stack
struct Frame<'g> {
    node: &'g str,
    visited: HashSet<&'g str>,
    sequence: TransformationPath,
    depth: usize,
}

impl<'g> Frame<'g> {
    fn enter(
        graph: &'g LineageGraph,
        node: &'g str,
        mut visited: HashSet<&'g str>,
        mut sequence: TransformationPath,
        depth: usize,
    ) -> Self {
        visited.insert(node);
        for edge in graph.outgoing_edges(node).iter().filter(|e| e.is_self_loop()) {
            sequence.push_distinct(edge.transformation_id);
        }
        Self {
            node,
            visited,
            sequence,
            depth,
        }
    }
}

enum Step {
    Continue,
    Stop,
}

/// Enumerate the distinct transformation sequences that lead to `target`.
///
/// Works on any lineage graph; walks never leave the set of tables that can
/// reach `target`, so an ancestor subgraph and the full graph give the same
/// answer.
pub fn enumerate_transformation_paths(
    graph: &LineageGraph,
    target: &str,
    limits: &PathLimits,
) -> Result<PathEnumeration, LineageError> {
    let reachable = reverse_reachable(graph, target)?;
    let origins = origin_ancestors(graph, target, &reachable);

    let mut result = PathEnumeration::default();

    'origins: for origin in origins {
        let mut stack = vec![Frame::enter(
            graph,
            origin,
            HashSet::new(),
            TransformationPath::default(),
            0,
        )];

        while let Some(frame) = stack.pop() {
            result.walks_expanded += 1;
            let mut children = Vec::new();

            for edge in graph.outgoing_edges(frame.node) {
                if edge.is_self_loop()
                    || !reachable.contains(edge.target)
                    || frame.visited.contains(edge.target)
                {
                    continue;
                }

                let depth = frame.depth + 1;
                if let Some(max) = limits.max_depth {
                    if depth > max {
                        match limits.on_limit {
                            LimitPolicy::Fail => {
                                return Err(LineageError::PathLimitExceeded {
                                    limit: PathLimit::Depth(max),
                                    found: depth,
                                })
                            }
                            LimitPolicy::Truncate => {
                                result.truncated = true;
                                continue;
                            }
                        }
                    }
                }

                let mut sequence = frame.sequence.clone();
                sequence.push_distinct(edge.transformation_id);

                if edge.target == target {
                    match record(&mut result, sequence, limits)? {
                        Step::Continue => continue,
                        Step::Stop => break 'origins,
                    }
                }

                children.push(Frame::enter(
                    graph,
                    edge.target,
                    frame.visited.clone(),
                    sequence,
                    depth,
                ));
            }

            // reversed so the first edge is expanded first
            stack.extend(children.into_iter().rev());
        }
    }

    debug!(
        target,
        paths = result.paths.len(),
        expanded = result.walks_expanded,
        truncated = result.truncated,
        "transformation paths enumerated"
    );

    Ok(result)
}

fn record(
    result: &mut PathEnumeration,
    sequence: TransformationPath,
    limits: &PathLimits,
) -> Result<Step, LineageError> {
    if result.paths.contains(&sequence) {
        return Ok(Step::Continue);
    }
    if let Some(max) = limits.max_paths {
        if result.paths.len() >= max {
            return match limits.on_limit {
                LimitPolicy::Fail => Err(LineageError::PathLimitExceeded {
                    limit: PathLimit::Paths(max),
                    found: result.paths.len() + 1,
                }),
                LimitPolicy::Truncate => {
                    result.truncated = true;
                    Ok(Step::Stop)
                }
            };
        }
    }
    result.paths.insert(sequence);
    Ok(Step::Continue)
}

/// Ancestors in source components of the ancestor graph, in graph node order.
///
/// Edges leaving the target are ignored: a walk ends when it arrives there.
fn origin_ancestors<'g>(
    graph: &'g LineageGraph,
    target: &str,
    reachable: &HashSet<&'g str>,
) -> Vec<&'g str> {
    let mut condensed: DiGraph<&'g str, ()> = DiGraph::new();
    let mut index: HashMap<&'g str, NodeIndex> = HashMap::new();

    for node in graph
        .nodes()
        .filter(|n| *n != target && reachable.contains(n))
    {
        index.insert(node, condensed.add_node(node));
    }
    for edge in graph.edges().filter(|e| !e.is_self_loop()) {
        if let (Some(from), Some(to)) = (index.get(edge.source), index.get(edge.target)) {
            condensed.add_edge(*from, *to, ());
        }
    }

    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    for (component, members) in kosaraju_scc(&condensed).into_iter().enumerate() {
        for member in members {
            component_of.insert(member, component);
        }
    }

    let mut fed: HashSet<usize> = HashSet::new();
    for edge in condensed.raw_edges() {
        let from = component_of.get(&edge.source());
        let to = component_of.get(&edge.target());
        if let (Some(from), Some(to)) = (from, to) {
            if from != to {
                fed.insert(*to);
            }
        }
    }

    condensed
        .node_indices()
        .filter(|idx| {
            component_of
                .get(idx)
                .is_some_and(|component| !fed.contains(component))
        })
        .map(|idx| condensed[idx])
        .collect()
}
