//! Metadata records
//!
//! A record says "these source tables feed this target table through this
//! transformation". Ingestion adapters produce records; the graph builder
//! consumes them. Missing cells arrive as `None` and are rejected by
//! [`MetadataRecord::validate`], never by the adapters.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One normalized (sources, target, transformation id) triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Source tables in the order they were listed
    pub sources: Vec<String>,
    /// Target table, absent when the input cell was empty
    pub target: Option<String>,
    /// Transformation label, absent when the input cell was empty
    pub transformation_id: Option<String>,
}

impl MetadataRecord {
    /// Create a record whose target and transformation id are present
    pub fn new<S, I>(sources: I, target: impl Into<String>, transformation_id: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            target: Some(target.into()),
            transformation_id: Some(transformation_id.into()),
        }
    }

    /// Check the record against the normalization rules.
    ///
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let target = match self.target.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ValidationError::MissingTarget { index }),
        };
        check_normalized(index, "target", target)?;

        if self.sources.is_empty() {
            return Err(ValidationError::EmptySources { index });
        }
        for (position, source) in self.sources.iter().enumerate() {
            if source.trim().is_empty() {
                return Err(ValidationError::BlankSource { index, position });
            }
            check_normalized(index, "source", source)?;
        }

        let transformation_id = match self.transformation_id.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(ValidationError::MissingTransformationId { index }),
        };
        check_normalized(index, "transformation id", transformation_id)?;

        Ok(())
    }

    /// Target table; only meaningful after a successful `validate`
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Transformation id; only meaningful after a successful `validate`
    pub fn transformation_id(&self) -> Option<&str> {
        self.transformation_id.as_deref()
    }
}

fn check_normalized(index: usize, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if normalize_name(value).as_deref() == Some(value) {
        Ok(())
    } else {
        Err(ValidationError::NotNormalized {
            index,
            field,
            value: value.to_string(),
        })
    }
}

/// Trim and lower-case a raw cell value. Blank values become `None`.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Split a whitespace-separated source list into normalized table names.
///
/// Each name becomes an independent edge to the record's target.
pub fn split_sources(raw: &str) -> Vec<String> {
    raw.split_whitespace().filter_map(normalize_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_record_passes() {
        let record = MetadataRecord::new(["a", "b"], "c", "t1");
        assert!(record.validate(0).is_ok());
    }

    #[test]
    fn missing_target_rejected() {
        let record = MetadataRecord {
            sources: vec!["a".into()],
            target: None,
            transformation_id: Some("t1".into()),
        };
        assert_eq!(
            record.validate(3),
            Err(ValidationError::MissingTarget { index: 3 })
        );
    }

    #[test]
    fn empty_sources_rejected() {
        let record = MetadataRecord::new(Vec::<String>::new(), "c", "t1");
        assert_eq!(
            record.validate(0),
            Err(ValidationError::EmptySources { index: 0 })
        );
    }

    #[test]
    fn blank_source_rejected() {
        let record = MetadataRecord::new(["a", "  "], "c", "t1");
        assert_eq!(
            record.validate(1),
            Err(ValidationError::BlankSource {
                index: 1,
                position: 1
            })
        );
    }

    #[test]
    fn missing_transformation_id_rejected() {
        let mut record = MetadataRecord::new(["a"], "c", "t1");
        record.transformation_id = Some(" ".into());
        assert_eq!(
            record.validate(0),
            Err(ValidationError::MissingTransformationId { index: 0 })
        );
    }

    #[test]
    fn unnormalized_values_rejected() {
        let record = MetadataRecord::new(["Orders"], "c", "t1");
        assert!(matches!(
            record.validate(0),
            Err(ValidationError::NotNormalized { field: "source", .. })
        ));

        let record = MetadataRecord::new(["a"], " c", "t1");
        assert!(matches!(
            record.validate(0),
            Err(ValidationError::NotNormalized { field: "target", .. })
        ));
    }

    #[test]
    fn normalize_and_split() {
        assert_eq!(normalize_name("  Sales.Orders "), Some("sales.orders".into()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(
            split_sources(" Stg_A  stg_b\tSTG_C "),
            vec!["stg_a", "stg_b", "stg_c"]
        );
        assert!(split_sources("").is_empty());
    }
}
