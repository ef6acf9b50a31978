//! Structured processing log.
use serde::Serialize;
use std::fmt::Display;

/// One entry of the conversion log.
///
/// `Display` renders the human readable line; serialization keeps the
/// fields so callers can format or localize the log themselves.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ProcessingEvent {
    WorkbookOpened { file_name: String, declared_size: u64, sheets: usize },
    SheetStarted { sheet: String, rows: usize, cols: usize },
    TableDetected { sheet: String, start_row: usize, end_row: usize, start_col: usize, end_col: usize, confidence: f64 },
    FallbackHeader { sheet: String, header_row: usize },
    RowsRejected { sheet: String, count: usize },
    DuplicatesSkipped { sheet: String, count: usize },
    SheetExtracted { sheet: String, rows: usize },
    /// The sheet produced no rows and was skipped
    EmptySheet { sheet: String },
    Completed { total_rows: usize },
}

impl ProcessingEvent {
    pub fn is_warning(&self) -> bool {
        matches!(self, ProcessingEvent::EmptySheet { .. } | ProcessingEvent::FallbackHeader { .. })
    }
}

impl Display for ProcessingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingEvent::WorkbookOpened { file_name, declared_size, sheets } => {
                write!(f, "Opened {} ({} bytes, {} sheets)", file_name, declared_size, sheets)
            }
            ProcessingEvent::SheetStarted { sheet, rows, cols } => {
                write!(f, "Processing {} ({} rows, {} cols)", sheet, rows, cols)
            }
            ProcessingEvent::TableDetected { sheet, start_row, end_row, start_col, end_col, confidence } => write!(
                f,
                "Table in {} at rows {}..={} cols {}..={} (confidence {:.2})",
                sheet, start_row, end_row, start_col, end_col, confidence
            ),
            ProcessingEvent::FallbackHeader { sheet, header_row } => {
                write!(f, "No table detected in {}, using row {} as header", sheet, header_row)
            }
            ProcessingEvent::RowsRejected { sheet, count } => write!(f, "Skipped {} rows in {}", count, sheet),
            ProcessingEvent::DuplicatesSkipped { sheet, count } => {
                write!(f, "Dropped {} duplicate rows in {}", count, sheet)
            }
            ProcessingEvent::SheetExtracted { sheet, rows } => write!(f, "Extracted {} rows from {}", rows, sheet),
            ProcessingEvent::EmptySheet { sheet } => write!(f, "No data rows found in {}", sheet),
            ProcessingEvent::Completed { total_rows } => write!(f, "Total rows: {}", total_rows),
        }
    }
}
