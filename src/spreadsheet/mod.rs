//! # Raw Sheet Reader
//!
//! Decodes uploaded workbook bytes into one dense grid of [`Cell`]s per sheet.
//! Office Open XML (.xlsx, .xlsm, .xlam) and OpenDocument (.ods) packages are
//! supported; the container is recognised from its signature, not from the
//! declared file name.
pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod excel;
pub(crate) mod ods;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

pub use cell::Cell;
pub use criteria::Criteria;
pub use sheet::RawSheet;

use crate::error::ConversionError;
use crate::error::FlattenerError;
use crate::helpers::reader::Container;
use crate::helpers::zip::ZipHelper;
use crate::spreadsheet::ods::OdsSpreadsheet;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::io::Cursor;
use thiserror::Error;
use zip::ZipArchive;

/// In-memory ZIP package of an uploaded workbook
pub(crate) type Archive = ZipArchive<Cursor<Vec<u8>>>;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing archive entry '{0}'")]
    FileError(String),

    #[error("Workbook contains no worksheets")]
    SpreadsheetEmptyError,

    #[error("Legacy binary (.xls) or password protected workbooks are not supported")]
    CompoundFileError,

    #[error("ZIP package is neither an Office Open XML nor an OpenDocument spreadsheet")]
    UnknownPackageError,

    #[error("Sheet '{sheet}' spans {rows} rows by {cols} columns, more than {limit} cells")]
    GridTooLargeError { sheet: String, rows: usize, cols: usize, limit: usize },
}

/// Common interface of the workbook decoders.
pub(crate) trait Spreadsheet {
    /// Declared file name of the workbook
    fn name(&self) -> String;

    /// Loads the workbook-wide shared string table (empty for formats without one)
    fn load_shared_strings(&mut self) -> Result<Vec<String>, FlattenerError>;

    /// Reads the worksheets selected by `criteria` in workbook order
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, FlattenerError>;
}

/// Opens the decoder matching the container signature of `bytes`.
pub(crate) fn open_spreadsheet(file_name: &str, bytes: Vec<u8>) -> Result<Box<dyn Spreadsheet>, FlattenerError> {
    match Container::sniff(&bytes) {
        Container::CompoundFile => Err(SpreadsheetError::CompoundFileError.into()),
        Container::Zip | Container::Unknown => {
            let mut zip = ZipArchive::new(Cursor::new(bytes))?;
            if zip.contains("xl/workbook.xml") {
                Ok(Box::new(XlsxSpreadsheet::open(file_name, zip)?))
            } else if ods::is_ods(&mut zip)? {
                Ok(Box::new(OdsSpreadsheet::open(file_name, zip)?))
            } else {
                Err(SpreadsheetError::UnknownPackageError.into())
            }
        }
    }
}

/// Decodes a workbook into raw sheets.
///
/// `declared_size` is the size reported by the uploader; it is only logged
/// and never checked against the byte length. Any decoding failure is fatal
/// for the whole workbook and surfaces as [`ConversionError::Parse`].
pub fn read_workbook(
    bytes: &[u8],
    file_name: &str,
    declared_size: u64,
    criteria: &Criteria,
) -> Result<Vec<RawSheet>, ConversionError> {
    tracing::debug!(file_name, declared_size, actual_size = bytes.len(), "reading workbook");
    read_sheets(bytes, file_name, criteria).map_err(|error| ConversionError::parse(file_name, error))
}

fn read_sheets(bytes: &[u8], file_name: &str, criteria: &Criteria) -> Result<Vec<RawSheet>, FlattenerError> {
    let mut spreadsheet = open_spreadsheet(file_name, bytes.to_vec())?;
    let shared_strings = spreadsheet.load_shared_strings()?;
    let sheets = spreadsheet.read_sheets(criteria)?;
    tracing::debug!(
        file_name = %spreadsheet.name(),
        sheets = sheets.len(),
        shared_strings = shared_strings.len(),
        "decoded workbook"
    );
    Ok(sheets
        .into_iter()
        .map(|sheet| sheet.into_raw_sheet(&shared_strings))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_parse_error() {
        let result = read_workbook(b"Segment,2021,2024\nNorth America,1,2\n", "data.xlsx", 38, &Criteria::default());
        match result {
            Err(ConversionError::Parse { file_name, message }) => {
                assert_eq!(file_name, "data.xlsx");
                assert!(!message.is_empty());
            }
            Ok(_) => panic!("plain text must not decode"),
        }
    }

    #[test]
    fn compound_file_is_rejected() {
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        bytes.resize(512, 0);
        let error = read_workbook(&bytes, "legacy.xls", 512, &Criteria::default()).unwrap_err();
        assert!(error.to_string().contains("Legacy binary"));
    }
}
