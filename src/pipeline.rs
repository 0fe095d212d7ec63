//! Lineage pipeline
//!
//! The explicit entry point: one value that owns its collaborators
//! (metadata source, exporter, optional renderer) and runs
//! load → build → extract → enumerate → export → render.
//!
//! ```text
//! MetadataSource ──► GraphBuilder ──► extract_ancestors ──► enumerate_paths
//!                                             │
//!                                             ├──► LineageExporter (catalog JSON)
//!                                             └──► GraphRenderer   (optional)
//! ```

use std::path::PathBuf;

use lineage_core::{
    extract_ancestors, BuildMode, GraphBuilder, PathLimits, TransformationPath, ValidationError,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::{InputFormat, TraceConfig};
use crate::error::{Result, TraceError};
use crate::export::{AtlasExporter, LineageExporter};
use crate::ingest::{CsvSource, ExcelSource, MetadataSource};
use crate::render::{renderer_for, GraphRenderer};

/// Per-run settings that are not collaborators
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub target: String,
    pub build_mode: BuildMode,
    pub limits: PathLimits,
    /// Catalog JSON destination
    pub output: PathBuf,
    /// Rendered graph destination; kept in the report when absent
    pub render_output: Option<PathBuf>,
}

impl PipelineOptions {
    pub fn new(target: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            build_mode: BuildMode::Strict,
            limits: PathLimits::unbounded(),
            output: output.into(),
            render_output: None,
        }
    }
}

/// A record the lenient builder left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

impl From<&ValidationError> for SkippedRecord {
    fn from(err: &ValidationError) -> Self {
        Self {
            index: err.index(),
            reason: err.to_string(),
        }
    }
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceReport {
    pub target: String,
    /// Size of the full lineage graph
    pub nodes: usize,
    pub edges: usize,
    /// Tables feeding the target, sorted
    pub ancestors: Vec<String>,
    pub skipped: Vec<SkippedRecord>,
    /// Distinct transformation sequences, sorted
    pub paths: Vec<TransformationPath>,
    pub truncated: bool,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_path: Option<PathBuf>,
    /// Rendered graph when no render destination was configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

pub struct LineagePipeline {
    source: Box<dyn MetadataSource>,
    exporter: Box<dyn LineageExporter>,
    renderer: Option<Box<dyn GraphRenderer>>,
    options: PipelineOptions,
}

impl LineagePipeline {
    pub fn new(
        source: Box<dyn MetadataSource>,
        exporter: Box<dyn LineageExporter>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            exporter,
            renderer: None,
            options,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn GraphRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Validate `config` and wire the default collaborators for it
    pub fn from_config(config: &TraceConfig) -> Result<Self> {
        let config = config.clone().validated()?;

        let source: Box<dyn MetadataSource> = match config.resolved_format()? {
            InputFormat::Csv => Box::new(CsvSource::new(&config.input)),
            InputFormat::Excel => Box::new(ExcelSource::new(
                &config.input,
                config.sheet.clone().unwrap_or_default(),
            )),
        };
        let exporter = Box::new(AtlasExporter::new(config.namespace.clone()));

        let options = PipelineOptions {
            target: config.target.clone(),
            build_mode: config.build_mode(),
            limits: config.path_limits(),
            output: config.output.clone(),
            render_output: config.render_output.clone(),
        };

        let mut pipeline = Self::new(source, exporter, options);
        pipeline.renderer = renderer_for(config.render);
        Ok(pipeline)
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    #[instrument(skip(self), fields(target = %self.options.target))]
    pub fn run(&self) -> Result<TraceReport> {
        info!(source = %self.source.describe(), "Starting lineage trace");

        let records = self.source.load()?;
        let built = GraphBuilder::new(self.options.build_mode).build(&records)?;
        for err in &built.skipped {
            warn!(index = err.index(), "Skipping invalid record: {}", err);
        }
        info!(
            records = records.len(),
            nodes = built.graph.node_count(),
            edges = built.graph.edge_count(),
            "Lineage graph built"
        );

        let lineage = extract_ancestors(&built.graph, &self.options.target)?;
        let found = lineage.enumerate_paths(&self.options.limits)?;
        if found.truncated {
            warn!(
                paths = found.len(),
                "Path enumeration hit its limit; result is partial"
            );
        }

        self.exporter
            .write_to(lineage.graph(), &self.options.output)?;
        info!(output = %self.options.output.display(), "Lineage exported");

        let (render_path, rendered) = match &self.renderer {
            Some(renderer) => {
                let text = renderer.render(lineage.graph(), Some(lineage.target()));
                match &self.options.render_output {
                    Some(path) => {
                        std::fs::write(path, text).map_err(|e| TraceError::write(path, e))?;
                        info!(path = %path.display(), "Graph rendered");
                        (Some(path.clone()), None)
                    }
                    None => (None, Some(text)),
                }
            }
            None => (None, None),
        };

        info!(
            ancestors = lineage.ancestors().len(),
            paths = found.len(),
            "Lineage trace completed"
        );

        Ok(TraceReport {
            target: lineage.target().to_string(),
            nodes: built.graph.node_count(),
            edges: built.graph.edge_count(),
            ancestors: lineage.ancestors().iter().cloned().collect(),
            skipped: built.skipped.iter().map(SkippedRecord::from).collect(),
            paths: found.paths.into_iter().collect(),
            truncated: found.truncated,
            output: self.options.output.clone(),
            render_path,
            rendered,
        })
    }
}
