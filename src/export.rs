//! Catalog export
//!
//! Serializes a lineage graph as an Atlas-style entity document: one
//! `Table` entity per node and one `Process` entity per edge. Names are
//! derived only from `(source, target, transformation_id)` and output order
//! follows the graph's insertion order, so re-exporting an unchanged graph
//! is byte-identical.

use std::path::Path;

use lineage_core::{LineageEdge, LineageGraph};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

pub const OPERATION_TRANSFORM: &str = "TRANSFORM";

/// Top-level export document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasDocument {
    pub entities: Vec<AtlasEntity>,
    /// Always empty; lineage is carried by process inputs/outputs
    pub relationships: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "typeName", content = "attributes")]
pub enum AtlasEntity {
    Table(TableAttributes),
    Process(ProcessAttributes),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAttributes {
    pub qualified_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAttributes {
    pub qualified_name: String,
    pub name: String,
    pub inputs: Vec<EntityRef>,
    pub outputs: Vec<EntityRef>,
    pub operation_type: String,
}

/// Reference to another entity by its unique qualified name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub unique_attributes: UniqueAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueAttributes {
    pub qualified_name: String,
}

/// Anything that can serialize a lineage graph for an external catalog
pub trait LineageExporter {
    fn export(&self, graph: &LineageGraph) -> Result<String>;

    /// Export and write to `path`, replacing any existing file
    fn write_to(&self, graph: &LineageGraph, path: &Path) -> Result<()> {
        let content = self.export(graph)?;
        std::fs::write(path, content).map_err(|e| TraceError::write(path, e))
    }
}

/// Atlas entity exporter
#[derive(Debug, Clone)]
pub struct AtlasExporter {
    namespace: String,
}

impl AtlasExporter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }

    fn reference(&self, table: &str) -> EntityRef {
        EntityRef {
            unique_attributes: UniqueAttributes {
                qualified_name: self.qualify(table),
            },
        }
    }

    fn process(&self, edge: &LineageEdge<'_>) -> AtlasEntity {
        let name = process_name(edge);
        AtlasEntity::Process(ProcessAttributes {
            qualified_name: self.qualify(&name),
            name,
            inputs: vec![self.reference(edge.source)],
            outputs: vec![self.reference(edge.target)],
            operation_type: OPERATION_TRANSFORM.to_string(),
        })
    }

    pub fn to_document(&self, graph: &LineageGraph) -> AtlasDocument {
        let tables = graph.nodes().map(|node| {
            AtlasEntity::Table(TableAttributes {
                qualified_name: self.qualify(node),
                name: node.to_string(),
            })
        });
        let processes = graph.edges().map(|edge| self.process(&edge));

        AtlasDocument {
            entities: tables.chain(processes).collect(),
            relationships: Vec::new(),
        }
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json(&self, graph: &LineageGraph) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.to_document(graph))?;
        json.push('\n');
        Ok(json)
    }
}

impl Default for AtlasExporter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_NAMESPACE)
    }
}

impl LineageExporter for AtlasExporter {
    fn export(&self, graph: &LineageGraph) -> Result<String> {
        self.to_json(graph)
    }
}

/// `{source}_to_{target}_{transformation_id}`
pub fn process_name(edge: &LineageEdge<'_>) -> String {
    format!(
        "{}_to_{}_{}",
        edge.source, edge.target, edge.transformation_id
    )
}
