//! lineage-trace: table lineage tracing
//!
//! Reads (source tables, target table, transformation id) metadata from
//! Excel or CSV, builds the lineage graph with [`lineage_core`], finds every
//! table that feeds a chosen target, enumerates the distinct transformation
//! sequences that produce it, and exports the result as Atlas-style catalog
//! JSON. Optional DOT / Mermaid rendering.
//!
//! # Modules
//!
//! - [`config`] - layered configuration (defaults, YAML file, CLI)
//! - [`ingest`] - metadata adapters ([`ingest::CsvSource`], [`ingest::ExcelSource`])
//! - [`export`] - catalog JSON export
//! - [`render`] - DOT and Mermaid renderers
//! - [`pipeline`] - the explicit entry point wiring them together

pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod render;

pub use config::{ConfigError, ConfigOverrides, InputFormat, RenderMode, TraceConfig};
pub use error::{Result, TraceError};
pub use export::{AtlasDocument, AtlasExporter, LineageExporter};
pub use ingest::{CsvSource, ExcelSource, IngestError, MetadataSource};
pub use pipeline::{LineagePipeline, PipelineOptions, SkippedRecord, TraceReport};
pub use render::{renderer_for, DotRenderer, GraphRenderer, MermaidRenderer};

// Re-export the engine so callers need only one dependency
pub use lineage_core;
