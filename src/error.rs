//! Error types for the lineage-trace pipeline
//!
//! Wraps engine errors together with the collaborator failures (config,
//! ingestion, export I/O) and maps each kind to a distinct exit status.

use std::path::PathBuf;

use lineage_core::{ErrorKind, LineageError, ValidationError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::ingest::IngestError;

/// Main error type for a pipeline run
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Lineage(#[from] LineageError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ValidationError> for TraceError {
    fn from(err: ValidationError) -> Self {
        TraceError::Lineage(LineageError::Validation(err))
    }
}

impl TraceError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TraceError::Write {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            TraceError::Config(_) => 2,
            TraceError::Lineage(err) => match err.kind() {
                ErrorKind::Validation => 3,
                ErrorKind::UnknownTarget => 4,
                ErrorKind::PathLimitExceeded => 5,
            },
            TraceError::Ingest(_) => 6,
            TraceError::Write { .. } | TraceError::Json(_) => 1,
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, TraceError>;
