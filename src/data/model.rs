use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a survey column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common survey dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Text written into a CSV field.
    ///
    /// Unlike [`Display`](fmt::Display) this is lossless for floats and
    /// leaves missing values as an empty field.
    pub fn to_csv_field(&self) -> String {
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => format_float(*v),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }

    /// Best-effort typing of a raw text field (CSV input).
    pub fn infer(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".into() } else { "-inf".into() }
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        // keep a float column recognisable as float after a round trip
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table (also used for projected views)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("column '{name}' has {found} values, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// An immutable column-oriented table.
///
/// Columns are reference-counted so a projection shares storage with the
/// table it was taken from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Arc<Column>>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset, checking that every column has the same length and
    /// that names are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        let mut seen = BTreeSet::new();
        for col in &columns {
            if col.values.len() != n_rows {
                return Err(DatasetError::RaggedColumn {
                    name: col.name.clone(),
                    expected: n_rows,
                    found: col.values.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(DatasetError::DuplicateColumn(col.name.clone()));
            }
        }
        let columns = columns.into_iter().map(Arc::new).collect();
        Ok(Dataset { columns, n_rows })
    }

    /// Assemble a view from columns of an already-checked dataset.
    pub(crate) fn from_parts(columns: Vec<Arc<Column>>, n_rows: usize) -> Self {
        Dataset { columns, n_rows }
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.as_ref())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Cell at (`row`, `col`) by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.columns.get(col)?.values.get(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_columns() {
        let err = Dataset::new(vec![
            Column::new("a", vec![CellValue::Integer(1), CellValue::Integer(2)]),
            Column::new("b", vec![CellValue::Integer(1)]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::RaggedColumn {
                name: "b".into(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Dataset::new(vec![
            Column::new("a", vec![]),
            Column::new("a", vec![]),
        ])
        .unwrap_err();
        assert_eq!(err, DatasetError::DuplicateColumn("a".into()));
    }

    #[test]
    fn csv_field_forms() {
        assert_eq!(CellValue::Float(2.0).to_csv_field(), "2.0");
        assert_eq!(CellValue::Float(0.25).to_csv_field(), "0.25");
        assert_eq!(CellValue::Float(f64::NAN).to_csv_field(), "");
        assert_eq!(CellValue::Null.to_csv_field(), "");
        assert_eq!(CellValue::Integer(-3).to_csv_field(), "-3");
        assert_eq!(CellValue::Bool(true).to_csv_field(), "true");
    }

    #[test]
    fn infer_matches_csv_field_forms() {
        for v in [
            CellValue::Float(2.0),
            CellValue::Float(-0.125),
            CellValue::Integer(42),
            CellValue::Bool(false),
            CellValue::String("Ohio".into()),
            CellValue::Null,
        ] {
            assert_eq!(CellValue::infer(&v.to_csv_field()), v);
        }
    }
}
