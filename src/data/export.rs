use std::io::Cursor;

use anyhow::{Context, Result};

use super::model::Dataset;

/// File name offered when the subset is saved.
pub const EXPORT_FILE_NAME: &str = "subset.csv";
/// MIME type of the exported bytes.
pub const EXPORT_MIME: &str = "text/csv";

/// A CSV-encoded subset ready to be written out.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub data: Cursor<Vec<u8>>,
}

impl ExportArtifact {
    pub fn bytes(&self) -> &[u8] {
        self.data.get_ref()
    }
}

/// Serialize a table as UTF-8 CSV: header row, one record per row, no
/// index column. The returned cursor is positioned at the start.
pub fn export_csv(view: &Dataset) -> Result<Cursor<Vec<u8>>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(view.column_names())
        .context("writing CSV header")?;

    let mut record = Vec::with_capacity(view.n_columns());
    for row in 0..view.n_rows() {
        record.clear();
        record.extend(
            view.columns()
                .iter()
                .map(|col| col.values[row].to_csv_field()),
        );
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV output: {}", e.error()))?;
    Ok(Cursor::new(bytes))
}

/// Encode `view` and wrap it with the download name and MIME type.
pub fn build_artifact(view: &Dataset) -> Result<ExportArtifact> {
    Ok(ExportArtifact {
        file_name: EXPORT_FILE_NAME,
        mime: EXPORT_MIME,
        data: export_csv(view)?,
    })
}
