//! Error types for the lineage engine
//!
//! Three error kinds leave the engine: per-record validation failures from
//! the builder, unknown targets at extraction/enumeration time, and
//! exhausted enumeration budgets. None of them are retried or swallowed
//! internally.

use std::fmt;

use thiserror::Error;

/// A metadata record that cannot enter the graph.
///
/// `index` is the zero-based position of the record in the sequence handed
/// to the builder, so callers can point back at the offending input row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record {index}: missing target table")]
    MissingTarget { index: usize },

    #[error("record {index}: no source tables")]
    EmptySources { index: usize },

    #[error("record {index}: source table at position {position} is blank")]
    BlankSource { index: usize, position: usize },

    #[error("record {index}: missing transformation id")]
    MissingTransformationId { index: usize },

    #[error("record {index}: {field} '{value}' is not trimmed and lower-cased")]
    NotNormalized {
        index: usize,
        field: &'static str,
        value: String,
    },
}

impl ValidationError {
    /// Position of the rejected record in the builder input
    pub fn index(&self) -> usize {
        match self {
            ValidationError::MissingTarget { index }
            | ValidationError::EmptySources { index }
            | ValidationError::BlankSource { index, .. }
            | ValidationError::MissingTransformationId { index }
            | ValidationError::NotNormalized { index, .. } => *index,
        }
    }
}

/// Which enumeration budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLimit {
    /// Maximum number of distinct transformation sequences
    Paths(usize),
    /// Maximum number of hops on a single walk
    Depth(usize),
}

impl fmt::Display for PathLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathLimit::Paths(max) => write!(f, "at most {} distinct paths", max),
            PathLimit::Depth(max) => write!(f, "at most {} hops per walk", max),
        }
    }
}

/// Main error type for engine queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineageError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown target table '{target}'")]
    UnknownTarget { target: String },

    #[error("Path limit exceeded: {limit} allowed, enumeration needed at least {found}")]
    PathLimitExceeded { limit: PathLimit, found: usize },
}

/// Coarse classification used by callers to pick messages and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    UnknownTarget,
    PathLimitExceeded,
}

impl LineageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineageError::Validation(_) => ErrorKind::Validation,
            LineageError::UnknownTarget { .. } => ErrorKind::UnknownTarget,
            LineageError::PathLimitExceeded { .. } => ErrorKind::PathLimitExceeded,
        }
    }

    pub(crate) fn unknown_target(target: &str) -> Self {
        LineageError::UnknownTarget {
            target: target.to_string(),
        }
    }
}
