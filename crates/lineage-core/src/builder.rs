//! Graph builder
//!
//! Turns metadata records into a [`LineageGraph`]. Every source of a record
//! becomes its own edge to the record's target, all sharing the record's
//! transformation id.

use tracing::debug;

use crate::error::ValidationError;
use crate::graph::LineageGraph;
use crate::record::MetadataRecord;

/// What to do with a record that fails validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Abort on the first invalid record
    #[default]
    Strict,
    /// Skip invalid records and report every one of them
    Lenient,
}

/// Result of a build: the graph plus whatever was skipped
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub graph: LineageGraph,
    /// Rejected records, in input order. Always empty in strict mode.
    pub skipped: Vec<ValidationError>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Builds lineage graphs from metadata records
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder {
    mode: BuildMode,
}

impl GraphBuilder {
    pub fn new(mode: BuildMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(BuildMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(BuildMode::Lenient)
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Build a graph from `records`.
    ///
    /// Strict mode returns the first validation error. Lenient mode never
    /// fails; rejected records are listed in [`BuildReport::skipped`].
    pub fn build<'a, I>(&self, records: I) -> Result<BuildReport, ValidationError>
    where
        I: IntoIterator<Item = &'a MetadataRecord>,
    {
        let mut graph = LineageGraph::new();
        let mut skipped = Vec::new();
        let mut accepted = 0usize;

        for (index, record) in records.into_iter().enumerate() {
            if let Err(err) = record.validate(index) {
                match self.mode {
                    BuildMode::Strict => return Err(err),
                    BuildMode::Lenient => {
                        skipped.push(err);
                        continue;
                    }
                }
            }

            // validate() guarantees both are present
            let (Some(target), Some(transformation_id)) =
                (record.target(), record.transformation_id())
            else {
                continue;
            };

            for source in &record.sources {
                graph.add_edge(source, target, transformation_id);
            }
            accepted += 1;
        }

        debug!(
            accepted,
            skipped = skipped.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "lineage graph built"
        );

        Ok(BuildReport { graph, skipped })
    }
}

impl LineageGraph {
    /// Strict build shorthand
    pub fn from_records(records: &[MetadataRecord]) -> Result<LineageGraph, ValidationError> {
        GraphBuilder::strict().build(records).map(|report| report.graph)
    }
}
