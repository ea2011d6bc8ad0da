use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use super::model::{Column, Dataset};

// ---------------------------------------------------------------------------
// Column name parsing
// ---------------------------------------------------------------------------

/// Set of requested column names. Iteration order carries no meaning.
pub type ColumnNameSet = BTreeSet<String>;

/// Split free text on commas into a set of trimmed, non-empty names.
pub fn parse_selection(raw_text: &str) -> ColumnNameSet {
    raw_text
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Validation against the dataset's columns
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("no column names were given")]
    EmptySelection,
    #[error("Invalid columns: {}", .0.join(", "))]
    InvalidColumns(Vec<String>),
}

/// A non-empty set of names known to exist in the dataset they were
/// validated against. Only [`validate`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedColumns(ColumnNameSet);

impl ValidatedColumns {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Check every requested name against `dataset_columns` (case-sensitive).
///
/// No partial result: a single unknown name fails the whole selection.
pub fn validate<S: AsRef<str>>(
    columns: ColumnNameSet,
    dataset_columns: &[S],
) -> Result<ValidatedColumns, SelectionError> {
    if columns.is_empty() {
        return Err(SelectionError::EmptySelection);
    }
    let known: BTreeSet<&str> = dataset_columns.iter().map(|c| c.as_ref()).collect();
    let missing: Vec<String> = columns
        .iter()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SelectionError::InvalidColumns(missing));
    }
    Ok(ValidatedColumns(columns))
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Keep only the validated columns, in the dataset's own column order.
/// Column storage is shared with `dataset`; nothing is copied or coerced.
pub fn project(dataset: &Dataset, validated: &ValidatedColumns) -> Dataset {
    let columns: Vec<Arc<Column>> = dataset
        .columns()
        .iter()
        .filter(|c| validated.contains(&c.name))
        .cloned()
        .collect();
    Dataset::from_parts(columns, dataset.n_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn survey() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "id",
                vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)],
            ),
            Column::new(
                "age",
                vec![CellValue::Integer(34), CellValue::Null, CellValue::Integer(71)],
            ),
            Column::new(
                "state",
                vec![
                    CellValue::String("OH".into()),
                    CellValue::String("TX".into()),
                    CellValue::String("CA".into()),
                ],
            ),
        ])
        .unwrap()
    }

    fn set(names: &[&str]) -> ColumnNameSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_empty_and_blank_input() {
        assert!(parse_selection("").is_empty());
        assert!(parse_selection("  , , ").is_empty());
        assert!(parse_selection(",,,").is_empty());
    }

    #[test]
    fn parse_deduplicates_and_trims() {
        assert_eq!(parse_selection("a, a, b"), set(&["a", "b"]));
        assert_eq!(parse_selection(" age, id ,age"), set(&["age", "id"]));
        assert_eq!(parse_selection("\tVCF0004\n"), set(&["VCF0004"]));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(parse_selection("Age, age"), set(&["Age", "age"]));
    }

    #[test]
    fn parse_never_yields_blank_names() {
        for raw in ["", " ", "a,,b", " , x ,\t,", "a , b , a ", "\n,\r\n"] {
            for name in parse_selection(raw) {
                assert!(!name.trim().is_empty(), "blank name from {raw:?}");
                assert_eq!(name, name.trim());
            }
        }
    }

    #[test]
    fn validate_empty_selection() {
        let err = validate(ColumnNameSet::new(), &["a", "b"]).unwrap_err();
        assert_eq!(err, SelectionError::EmptySelection);
    }

    #[test]
    fn validate_reports_unknown_names() {
        let err = validate(set(&["x"]), &["a", "b"]).unwrap_err();
        assert_eq!(err, SelectionError::InvalidColumns(vec!["x".into()]));
        assert_eq!(err.to_string(), "Invalid columns: x");
    }

    #[test]
    fn validate_reports_every_unknown_name() {
        let err = validate(set(&["a", "zz", "Y"]), &["a", "y"]).unwrap_err();
        match err {
            SelectionError::InvalidColumns(mut missing) => {
                missing.sort();
                assert_eq!(missing, vec!["Y".to_string(), "zz".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_known_names() {
        let ok = validate(set(&["b", "a"]), &["a", "b", "c"]).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(ok.contains("a") && ok.contains("b") && !ok.contains("c"));
    }

    #[test]
    fn project_keeps_rows_and_values() {
        let ds = survey();
        let cols = validate(set(&["state", "id"]), &ds.column_names()).unwrap();
        let view = project(&ds, &cols);

        assert_eq!(view.column_names(), vec!["id", "state"]);
        assert_eq!(view.n_rows(), ds.n_rows());
        for name in view.column_names() {
            assert_eq!(view.column(name), ds.column(name));
        }
    }

    #[test]
    fn project_shares_column_storage() {
        let ds = survey();
        let cols = validate(set(&["age"]), &ds.column_names()).unwrap();
        let view = project(&ds, &cols);

        assert!(Arc::ptr_eq(&view.columns()[0], &ds.columns()[1]));
        // source untouched
        assert_eq!(ds.column_names(), vec!["id", "age", "state"]);
    }
}
