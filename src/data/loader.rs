use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row of column names, one record per respondent
/// * `.json`    – `[{ "col": value, ... }, ...]` (records orient)
/// * `.parquet` – any flat schema; categoricals and decimals are read as text
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.n_rows(),
        dataset.n_columns(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, cells) in values.iter_mut().enumerate() {
            cells.push(CellValue::infer(record.get(col_idx).unwrap_or("")));
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();
    Ok(Dataset::new(columns)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "VCF0004": 1952, "VCF0101": 34, "VCF0901b": "OH" },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; keys missing from a record
/// become nulls.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&name).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect();
            Column::new(name, cells)
        })
        .collect();
    Ok(Dataset::new(columns)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, one [`Column`] per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, cells) in values.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                cells.push(arrow_to_cell(array, row));
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();
    Ok(Dataset::new(columns)?)
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
///
/// Types without a dedicated arm (dictionary-encoded categoricals, decimals,
/// view and binary types) keep Arrow's own text rendering of the value.
fn arrow_to_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            // values above i64::MAX keep their exact digits as text
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or_else(|_| CellValue::String(v.to_string()))
        }
        DataType::Float32 => {
            // widen through the shortest f32 text so 0.1f32 stays 0.1
            let v = col.as_primitive::<Float32Type>().value(row);
            CellValue::Float(v.to_string().parse().unwrap_or(v as f64))
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            match arrow::util::display::array_value_to_string(col, row) {
                Ok(text) => CellValue::Date(text),
                Err(_) => CellValue::Null,
            }
        }
        other => match arrow::util::display::array_value_to_string(col, row) {
            Ok(text) => CellValue::String(text),
            Err(e) => {
                log::warn!("Cannot render {other:?} value at row {row}: {e}");
                CellValue::Null
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{
        BooleanArray, DictionaryArray, Float32Array, Float64Array, Int32Array, StringArray,
        UInt64Array, UInt8Array,
    };
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::export::export_csv;
    use crate::data::selection::{parse_selection, project, validate};

    fn write_parquet(batch: &RecordBatch) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(file.as_file().try_clone().unwrap(), batch.schema(), None)
                .unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        file
    }

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_with_inferred_types() {
        let file = write_temp(".csv", "id,age,state\n1,34,OH\n2,,TX\n3,71.5,CA\n");
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.column_names(), vec!["id", "age", "state"]);
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.cell(1, 1), Some(&CellValue::Null));
        assert_eq!(ds.cell(2, 1), Some(&CellValue::Float(71.5)));
        assert_eq!(ds.cell(0, 2), Some(&CellValue::String("OH".into())));
    }

    #[test]
    fn loads_json_records_with_missing_keys() {
        let file = write_temp(
            ".json",
            r#"[{"id": 1, "state": "OH"}, {"id": 2, "voted": true}]"#,
        );
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.column("state").unwrap().values[1], CellValue::Null);
        assert_eq!(ds.column("voted").unwrap().values[0], CellValue::Null);
        assert_eq!(ds.column("voted").unwrap().values[1], CellValue::Bool(true));
    }

    #[test]
    fn rejects_non_array_json() {
        let file = write_temp(".json", r#"{"id": 1}"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Expected top-level JSON array"));
    }

    #[test]
    fn loads_parquet_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("state", DataType::Utf8, true),
            Field::new("weight", DataType::Float64, false),
            Field::new("voted", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("OH"), None])),
                Arc::new(Float64Array::from(vec![0.5, 1.25])),
                Arc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();

        let file = write_parquet(&batch);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.column_names(), vec!["id", "state", "weight", "voted"]);
        assert_eq!(ds.cell(1, 0), Some(&CellValue::Integer(2)));
        assert_eq!(ds.cell(1, 1), Some(&CellValue::Null));
        assert_eq!(ds.cell(1, 2), Some(&CellValue::Float(1.25)));
        assert_eq!(ds.cell(0, 3), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn parquet_unsigned_and_categorical_columns_keep_values() {
        let party: DictionaryArray<Int8Type> =
            vec!["Strong Democrat", "Independent"].into_iter().collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("VCF0101", DataType::UInt8, false),
            Field::new("VCF0301", party.data_type().clone(), false),
            Field::new("VCF0006", DataType::UInt64, false),
            Field::new("VCF0009z", DataType::Float32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt8Array::from(vec![34, 71])),
                Arc::new(party),
                Arc::new(UInt64Array::from(vec![7, u64::MAX])),
                Arc::new(Float32Array::from(vec![0.1, 1.5])),
            ],
        )
        .unwrap();

        let file = write_parquet(&batch);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.cell(0, 0), Some(&CellValue::Integer(34)));
        assert_eq!(ds.cell(1, 0), Some(&CellValue::Integer(71)));
        assert_eq!(ds.cell(0, 1), Some(&CellValue::String("Strong Democrat".into())));
        assert_eq!(ds.cell(1, 1), Some(&CellValue::String("Independent".into())));
        assert_eq!(ds.cell(0, 2), Some(&CellValue::Integer(7)));
        assert_eq!(ds.cell(1, 2), Some(&CellValue::String(u64::MAX.to_string())));
        assert_eq!(ds.cell(0, 3), Some(&CellValue::Float(0.1)));

        let columns = parse_selection("VCF0101, VCF0301");
        let cols = validate(columns, &ds.column_names()).unwrap();
        let csv = export_csv(&project(&ds, &cols)).unwrap().into_inner();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "VCF0101,VCF0301\n34,Strong Democrat\n71,Independent\n"
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".dta", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension: .dta"));
    }
}
