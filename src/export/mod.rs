//! # Export Adapters
//!
//! Serialize a [`ConversionResult`] as CSV, a single-sheet XLSX workbook or
//! pretty JSON.
pub mod csv;
pub mod json;
pub mod xlsx;

use crate::flatten::ConversionResult;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => f.write_str("CSV"),
            ExportFormat::Xlsx => f.write_str("XLSX"),
            ExportFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Failure of an adapter, naming the target format.
#[derive(Debug, Error)]
#[error("{format} export failed: {message}")]
pub struct ExportError {
    pub format: ExportFormat,
    pub message: String,
}

impl ExportError {
    pub(crate) fn new(format: ExportFormat, error: impl Display) -> Self {
        ExportError { format, message: error.to_string() }
    }
}

/// Encodes `result` in `format`.
pub fn export(result: &ConversionResult, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => csv::to_csv_bytes(result),
        ExportFormat::Xlsx => xlsx::to_xlsx_bytes(result),
        ExportFormat::Json => json::to_json_bytes(result),
    }
}

/// `Market_Data_{base name}_{epoch millis}.{ext}`
pub fn output_file_name(original: &str, format: ExportFormat, epoch_millis: i64) -> String {
    let base = Path::new(original)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("workbook");
    format!("Market_Data_{}_{}.{}", base, epoch_millis, format.extension())
}

/// Writes the export of `result` into `dir` and returns the written path.
pub fn write_to_dir(
    result: &ConversionResult,
    format: ExportFormat,
    dir: &Path,
    original: &str,
) -> Result<PathBuf, ExportError> {
    let bytes = export(result, format)?;
    let path = dir.join(output_file_name(original, format, chrono::Utc::now().timestamp_millis()));
    std::fs::write(&path, bytes).map_err(|error| ExportError::new(format, error))?;
    tracing::info!("Wrote {} rows to {}", result.rows.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{flatten_sheets, Options};
    use crate::spreadsheet::{Cell, RawSheet};

    fn result() -> ConversionResult {
        let sheet = RawSheet::new("Data", vec![
            vec![Cell::text("Segment"), Cell::text("2021"), Cell::text("2022")],
            vec![Cell::text("Hybrid"), Cell::Number(1.0), Cell::Number(2.0)],
        ]);
        flatten_sheets(&[sheet], &Options::default())
    }

    #[test]
    fn output_names() {
        assert_eq!(
            output_file_name("reports/EV Market.xlsx", ExportFormat::Csv, 1700000000000),
            "Market_Data_EV Market_1700000000000.csv"
        );
        assert_eq!(output_file_name("", ExportFormat::Json, 5), "Market_Data_workbook_5.json");
    }

    #[test]
    fn error_names_format() {
        let error = ExportError::new(ExportFormat::Xlsx, "disk full");
        assert_eq!(error.to_string(), "XLSX export failed: disk full");
    }

    #[test]
    fn writes_into_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = write_to_dir(&result(), ExportFormat::Json, dir.path(), "upload.xlsx")?;
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        assert!(name.starts_with("Market_Data_upload_"));
        assert!(name.ends_with(".json"));
        assert!(std::fs::read(&path)?.starts_with(b"{"));
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_export_error() {
        let missing = Path::new("/nonexistent/sheet-flattener/output");
        match write_to_dir(&result(), ExportFormat::Csv, missing, "upload.xlsx") {
            Err(error) => assert_eq!(error.format, ExportFormat::Csv),
            Ok(path) => panic!("unexpected write to {}", path.display()),
        }
    }
}
