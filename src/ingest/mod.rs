//! Metadata ingestion
//!
//! Adapters that read lineage metadata from spreadsheets and CSV files and
//! hand the engine strongly typed [`MetadataRecord`]s. Cell values are
//! normalized here (trim, lower-case, empty as absent) and nowhere else.
//!
//! Every adapter expects a header row naming three columns, in any order:
//!
//! | column              | meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `source_tables`     | space-separated source table names        |
//! | `target_table`      | table produced by the transformation      |
//! | `transformation_id` | label of the transformation               |
//!
//! Extra columns are ignored.

mod csv_source;
mod excel_source;

use std::path::PathBuf;

use lineage_core::{normalize_name, split_sources, MetadataRecord};
use thiserror::Error;

pub use csv_source::CsvSource;
pub use excel_source::ExcelSource;

pub const SOURCE_COLUMN: &str = "source_tables";
pub const TARGET_COLUMN: &str = "target_table";
pub const TRANSFORMATION_COLUMN: &str = "transformation_id";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read CSV file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("required column '{column}' missing from header row")]
    MissingColumn { column: &'static str },
}

/// Anything that can produce metadata records
pub trait MetadataSource {
    fn load(&self) -> Result<Vec<MetadataRecord>, IngestError>;

    /// Short human-readable origin, used in log lines
    fn describe(&self) -> String;
}

/// Positions of the required columns in a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnIndex {
    pub sources: usize,
    pub target: usize,
    pub transformation_id: usize,
}

impl ColumnIndex {
    /// Locate the required columns. Header names are compared after
    /// trimming and lower-casing.
    pub fn locate<I, S>(headers: I) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let names: Vec<Option<String>> = headers
            .into_iter()
            .map(|h| h.and_then(|h| normalize_name(h.as_ref())))
            .collect();

        let find = |column: &'static str| {
            names
                .iter()
                .position(|name| name.as_deref() == Some(column))
                .ok_or(IngestError::MissingColumn { column })
        };

        Ok(Self {
            sources: find(SOURCE_COLUMN)?,
            target: find(TARGET_COLUMN)?,
            transformation_id: find(TRANSFORMATION_COLUMN)?,
        })
    }
}

/// Raw text of the three cells of one data row; `None` is an empty cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RowCells {
    pub sources: Option<String>,
    pub target: Option<String>,
    pub transformation_id: Option<String>,
}

impl RowCells {
    /// Normalize into a record. A row with all three cells empty is
    /// skipped; anything else becomes a record, valid or not.
    pub fn into_record(self) -> Option<MetadataRecord> {
        let sources = self
            .sources
            .as_deref()
            .map(split_sources)
            .unwrap_or_default();
        let target = self.target.as_deref().and_then(normalize_name);
        let transformation_id = self.transformation_id.as_deref().and_then(normalize_name);

        if sources.is_empty() && target.is_none() && transformation_id.is_none() {
            return None;
        }

        Some(MetadataRecord {
            sources,
            target,
            transformation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_columns_in_any_order() {
        let headers = [
            Some("Notes"),
            Some(" Transformation_ID "),
            None,
            Some("TARGET_TABLE"),
            Some("source_tables"),
        ];
        let index = ColumnIndex::locate(headers).unwrap();
        assert_eq!(
            index,
            ColumnIndex {
                sources: 4,
                target: 3,
                transformation_id: 1
            }
        );
    }

    #[test]
    fn missing_column_is_named() {
        let err = ColumnIndex::locate([Some("source_tables"), Some("target_table")]).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn {
                column: TRANSFORMATION_COLUMN
            }
        ));
    }

    #[test]
    fn row_normalization() {
        let row = RowCells {
            sources: Some("  Orders   Customers ".into()),
            target: Some(" Sales ".into()),
            transformation_id: Some("JOIN_1".into()),
        };
        assert_eq!(
            row.into_record(),
            Some(MetadataRecord::new(["orders", "customers"], "sales", "join_1"))
        );
    }

    #[test]
    fn blank_and_partial_rows() {
        assert_eq!(RowCells::default().into_record(), None);
        let whitespace = RowCells {
            sources: Some("   ".into()),
            target: Some(" ".into()),
            transformation_id: None,
        };
        assert_eq!(whitespace.into_record(), None);

        let partial = RowCells {
            sources: Some("a".into()),
            ..RowCells::default()
        };
        let record = partial.into_record().unwrap();
        assert_eq!(record.target, None);
        assert!(record.validate(0).is_err());
    }
}
