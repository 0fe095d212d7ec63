//! Excel / OpenDocument metadata reader

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use lineage_core::MetadataRecord;
use tracing::debug;

use super::{ColumnIndex, IngestError, MetadataSource, RowCells};

/// Reads metadata from one worksheet of a workbook. The first row of the
/// used range is the header row.
#[derive(Debug, Clone)]
pub struct ExcelSource {
    path: PathBuf,
    sheet: String,
}

impl ExcelSource {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    fn error(&self, source: calamine::Error) -> IngestError {
        IngestError::Workbook {
            path: self.path.clone(),
            source,
        }
    }
}

impl MetadataSource for ExcelSource {
    fn load(&self) -> Result<Vec<MetadataRecord>, IngestError> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| self.error(e))?;

        let available = workbook.sheet_names();
        if !available.iter().any(|name| *name == self.sheet) {
            return Err(IngestError::SheetNotFound {
                sheet: self.sheet.clone(),
                available,
            });
        }

        let range = workbook
            .worksheet_range(&self.sheet)
            .map_err(|e| self.error(e))?;
        let records = records_from_rows(range.rows())?;

        debug!(
            path = %self.path.display(),
            sheet = %self.sheet,
            records = records.len(),
            "worksheet metadata loaded"
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("excel:{}#{}", self.path.display(), self.sheet)
    }
}

/// Header row first, data rows after. An empty sheet has no header and
/// therefore fails on the first required column.
fn records_from_rows<'a, I>(mut rows: I) -> Result<Vec<MetadataRecord>, IngestError>
where
    I: Iterator<Item = &'a [Data]>,
{
    let header = rows.next().unwrap_or_default();
    let columns = ColumnIndex::locate(header.iter().map(cell_text))?;

    let cell = |row: &[Data], idx: usize| row.get(idx).and_then(cell_text);

    Ok(rows
        .filter_map(|row| {
            RowCells {
                sources: cell(row, columns.sources),
                target: cell(row, columns.target),
                transformation_id: cell(row, columns.transformation_id),
            }
            .into_record()
        })
        .collect())
}

/// Text form of a typed cell. Empty and error cells are absent; integral
/// floats lose their fractional part so `42.0` reads as `42`.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[test]
    fn typed_cells_become_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&s("  ")), None);
        assert_eq!(cell_text(&Data::Float(42.0)).as_deref(), Some("42"));
        assert_eq!(cell_text(&Data::Float(1.5)).as_deref(), Some("1.5"));
        assert_eq!(cell_text(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(cell_text(&Data::Bool(true)).as_deref(), Some("true"));
        assert_eq!(cell_text(&s("Orders")).as_deref(), Some("Orders"));
    }

    #[test]
    fn rows_become_records() {
        let rows: Vec<Vec<Data>> = vec![
            vec![s("target_table"), s("source_tables"), s("transformation_id")],
            vec![s("C"), s("a b"), s("T1")],
            vec![Data::Empty, Data::Empty, Data::Empty],
            vec![s("z"), s("c"), Data::Float(2.0)],
            vec![s("orphan")],
        ];
        let records = records_from_rows(rows.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(
            records,
            vec![
                MetadataRecord::new(["a", "b"], "c", "t1"),
                MetadataRecord::new(["c"], "z", "2"),
                MetadataRecord {
                    sources: vec![],
                    target: Some("orphan".into()),
                    transformation_id: None,
                },
            ]
        );
    }

    #[test]
    fn empty_sheet_reports_missing_column() {
        let err = records_from_rows(std::iter::empty()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    fn fixture() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/metadata.xlsx")
    }

    #[test]
    fn loads_named_sheet() {
        let source = ExcelSource::new(fixture(), "lineage");
        assert_eq!(source.describe(), format!("excel:{}#lineage", fixture().display()));

        let records = source.load().unwrap();
        assert_eq!(
            records,
            vec![
                MetadataRecord::new(["a", "b"], "c", "t1"),
                MetadataRecord::new(["c"], "z", "2"),
                MetadataRecord::new(["b"], "c", "t3"),
            ]
        );
    }

    #[test]
    fn unknown_sheet_lists_available_sheets() {
        let err = ExcelSource::new(fixture(), "Lineage").load().unwrap_err();
        match err {
            IngestError::SheetNotFound { sheet, available } => {
                assert_eq!(sheet, "Lineage");
                assert_eq!(available, vec!["lineage", "notes"]);
            }
            other => panic!("expected SheetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn sheet_without_required_columns() {
        let err = ExcelSource::new(fixture(), "notes").load().unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn {
                column: "source_tables"
            }
        ));
    }

    #[test]
    fn missing_workbook() {
        let err = ExcelSource::new("/no/such/book.xlsx", "metadata")
            .load()
            .unwrap_err();
        assert!(matches!(err, IngestError::Workbook { .. }));
    }
}
