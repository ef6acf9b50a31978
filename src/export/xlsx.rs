use crate::export::{ExportError, ExportFormat};
use crate::flatten::{ConversionResult, DIMENSION_COLUMNS};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

pub const SHEET_NAME: &str = "Market Data";

fn write_workbook(result: &ConversionResult) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    let bold = Format::new().set_bold();

    for (col, column) in result.summary.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column, &bold)?;
    }
    for (index, row) in result.rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, column) in result.summary.columns.iter().enumerate() {
            let value = row.field(column);
            // Year and CAGR values go out as numbers when they parse
            let number = match DIMENSION_COLUMNS.contains(&column.as_str()) {
                true => None,
                false => value.parse::<f64>().ok(),
            };
            match number {
                Some(number) => worksheet.write_number(row_num, col as u16, number)?,
                None if value.is_empty() => continue,
                None => worksheet.write_string(row_num, col as u16, value)?,
            };
        }
    }
    workbook.save_to_buffer()
}

/// Single-sheet workbook with the header row and one row per flattened row.
pub fn to_xlsx_bytes(result: &ConversionResult) -> Result<Vec<u8>, ExportError> {
    write_workbook(result).map_err(|error| ExportError::new(ExportFormat::Xlsx, error))
}
