//! lineage-core: table lineage engine
//!
//! Pure, synchronous lineage logic with NO I/O:
//! - Metadata records and their normalization rules
//! - Lineage multigraph (parallel edges keep every transformation id)
//! - Strict / lenient graph builder
//! - Ancestor extraction (induced subgraph copy)
//! - Transformation path enumeration with caller-imposed limits
//!
//! # Architecture
//!
//! ```text
//! MetadataRecord* ──► GraphBuilder ──► LineageGraph
//!                                          │
//!                                  extract_ancestors(target)
//!                                          │
//!                                          ▼
//!                                   AncestorSubgraph ──► enumerate_paths(limits)
//!                                                                │
//!                                                                ▼
//!                                                   {TransformationPath}
//! ```
//!
//! Graphs are read-only once built. Extraction and enumeration take `&self`
//! and never mutate shared state, so one graph can serve concurrent queries
//! without locking.
//!
//! # Example
//!
//! ```
//! use lineage_core::{extract_ancestors, LineageGraph, MetadataRecord, PathLimits};
//!
//! let graph = LineageGraph::from_records(&[
//!     MetadataRecord::new(["a", "b"], "c", "t1"),
//!     MetadataRecord::new(["c"], "z", "t2"),
//!     MetadataRecord::new(["b"], "c", "t3"),
//! ])
//! .unwrap();
//!
//! let lineage = extract_ancestors(&graph, "z").unwrap();
//! let found = lineage.enumerate_paths(&PathLimits::unbounded()).unwrap();
//! assert_eq!(found.len(), 2);
//! ```

mod ancestors;
mod builder;
mod error;
mod graph;
mod paths;
mod record;

pub use ancestors::{ancestors, extract_ancestors, AncestorSubgraph};
pub use builder::{BuildMode, BuildReport, GraphBuilder};
pub use error::{ErrorKind, LineageError, PathLimit, ValidationError};
pub use graph::{LineageEdge, LineageGraph};
pub use paths::{
    enumerate_transformation_paths, LimitPolicy, PathEnumeration, PathLimits, TransformationPath,
};
pub use record::{normalize_name, split_sources, MetadataRecord};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn query_types_are_thread_safe() {
        assert_send_sync::<LineageGraph>();
        assert_send_sync::<AncestorSubgraph>();
        assert_send_sync::<PathEnumeration>();
        assert_send_sync::<LineageError>();
    }
}
