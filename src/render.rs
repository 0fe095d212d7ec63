//! Graph rendering
//!
//! Text renderers for lineage graphs. Layout is left to the consuming
//! tool (Graphviz, a Mermaid viewer); these only describe nodes, labelled
//! edges and which table is the final target.

use std::collections::HashMap;
use std::fmt::Write;

use lineage_core::LineageGraph;
use petgraph::dot::{Config, Dot};

use crate::config::RenderMode;

const NODE_FILL: &str = "skyblue";
const TARGET_FILL: &str = "lightcoral";
const EDGE_LABEL_COLOR: &str = "red";

/// Turns a lineage graph into a textual diagram
pub trait GraphRenderer {
    /// Render `graph`, highlighting `target` when given
    fn render(&self, graph: &LineageGraph, target: Option<&str>) -> String;

    /// Conventional file extension for the output, without the dot
    fn extension(&self) -> &'static str;
}

/// Renderer for a configured mode; `None` renders nothing
pub fn renderer_for(mode: RenderMode) -> Option<Box<dyn GraphRenderer>> {
    match mode {
        RenderMode::Dot => Some(Box::new(DotRenderer)),
        RenderMode::Mermaid => Some(Box::new(MermaidRenderer)),
        RenderMode::None => None,
    }
}

/// Graphviz DOT output, left-to-right
#[derive(Debug, Clone, Copy, Default)]
pub struct DotRenderer;

impl GraphRenderer for DotRenderer {
    fn render(&self, graph: &LineageGraph, target: Option<&str>) -> String {
        // bound here so the borrow of `target` outlives `body`
        let node_attrs = |_, (_, name): (_, &String)| {
            let fill = if Some(name.as_str()) == target {
                TARGET_FILL
            } else {
                NODE_FILL
            };
            format!(
                "label = \"{}\" style = \"filled\" fillcolor = \"{}\" ",
                escape_dot(name),
                fill
            )
        };
        let body = Dot::with_attr_getters(
            graph.as_petgraph(),
            &[
                Config::GraphContentOnly,
                Config::NodeNoLabel,
                Config::EdgeNoLabel,
            ],
            &|_, edge| {
                format!(
                    "label = \"{}\" fontcolor = \"{}\" ",
                    escape_dot(edge.weight()),
                    EDGE_LABEL_COLOR
                )
            },
            &node_attrs,
        );

        let mut out = String::new();
        let _ = writeln!(out, "digraph lineage {{");
        let _ = writeln!(out, "    rankdir=LR");
        let _ = writeln!(out, "    node [shape=box]");
        let _ = write!(out, "{}", body);
        let _ = writeln!(out, "}}");
        out
    }

    fn extension(&self) -> &'static str {
        "dot"
    }
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Mermaid `flowchart LR` output. Node ids follow graph node order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidRenderer;

impl GraphRenderer for MermaidRenderer {
    fn render(&self, graph: &LineageGraph, target: Option<&str>) -> String {
        let ids: HashMap<&str, String> = graph
            .nodes()
            .enumerate()
            .map(|(i, name)| (name, format!("n{}", i)))
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "flowchart LR");
        for name in graph.nodes() {
            let _ = writeln!(out, "    {}[\"{}\"]", ids[name], escape_mermaid(name));
        }
        for edge in graph.edges() {
            let _ = writeln!(
                out,
                "    {} -->|{}| {}",
                ids[edge.source],
                escape_mermaid(edge.transformation_id),
                ids[edge.target]
            );
        }
        if let Some(id) = target.and_then(|t| ids.get(t)) {
            let _ = writeln!(out, "    classDef target fill:{},stroke:#333", TARGET_FILL);
            let _ = writeln!(out, "    class {} target", id);
        }
        out
    }

    fn extension(&self) -> &'static str {
        "mmd"
    }
}

fn escape_mermaid(text: &str) -> String {
    text.replace('"', "#quot;").replace('|', "#124;")
}
