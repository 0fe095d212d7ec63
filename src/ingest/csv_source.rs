//! CSV metadata reader

use std::path::{Path, PathBuf};

use lineage_core::MetadataRecord;
use tracing::debug;

use super::{ColumnIndex, IngestError, MetadataSource, RowCells};

/// Reads metadata from a CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, source: csv::Error) -> IngestError {
        IngestError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl MetadataSource for CsvSource {
    fn load(&self) -> Result<Vec<MetadataRecord>, IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.error(e))?;

        let headers = reader.headers().map_err(|e| self.error(e))?.clone();
        let columns = ColumnIndex::locate(headers.iter().map(Some))?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.error(e))?;
            let cell = |idx: usize| {
                row.get(idx)
                    .filter(|value| !value.trim().is_empty())
                    .map(str::to_string)
            };
            let cells = RowCells {
                sources: cell(columns.sources),
                target: cell(columns.target),
                transformation_id: cell(columns.transformation_id),
            };
            if let Some(record) = cells.into_record() {
                records.push(record);
            }
        }

        debug!(path = %self.path.display(), records = records.len(), "csv metadata loaded");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_records_with_extra_columns() {
        let file = write_csv(
            "owner,transformation_id,source_tables,target_table\n\
             alice,T1,A B,C\n\
             bob,t2,c,Z\n\
             ,,,\n\
             carol,t3, b ,c\n",
        );
        let records = CsvSource::new(file.path()).load().unwrap();
        assert_eq!(
            records,
            vec![
                MetadataRecord::new(["a", "b"], "c", "t1"),
                MetadataRecord::new(["c"], "z", "t2"),
                MetadataRecord::new(["b"], "c", "t3"),
            ]
        );
    }

    #[test]
    fn short_rows_give_absent_cells() {
        let file = write_csv("source_tables,target_table,transformation_id\na\n");
        let records = CsvSource::new(file.path()).load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, None);
        assert_eq!(records[0].transformation_id, None);
    }

    #[test]
    fn missing_header_column() {
        let file = write_csv("source_tables,target\na,b\n");
        let err = CsvSource::new(file.path()).load().unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn {
                column: "target_table"
            }
        ));
    }

    #[test]
    fn missing_file() {
        let err = CsvSource::new("/definitely/not/here.csv")
            .load()
            .unwrap_err();
        assert!(matches!(err, IngestError::Csv { .. }));
    }
}
