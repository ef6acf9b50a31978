//! # Sheet Flattener
//!
//! Turns inconsistently structured market-data workbooks into one flat table.
//!
//! A workbook (`.xlsx` or `.ods`) is decoded into dense cell grids, every
//! sheet is scanned for one or more header + data tables, and each data row
//! is normalized into a [`FlatRow`] with inferred dimensions (region,
//! country, segment axis, product, units) and a year series with its CAGR.
//!
//! ## Pipeline
//!
//! - [`spreadsheet`]: reads raw sheets from the uploaded bytes
//! - [`table`]: finds table regions and classifies year columns
//! - [`semantic`]: extracts labels, "By X" axes, units and geography
//! - [`metric`]: formats year values and computes CAGR
//! - [`flatten`]: deduplicates, numbers and summarizes rows, keeps the event log
//! - [`export`]: CSV, XLSX and JSON adapters
//!
//! ```no_run
//! use sheet_flattener::{convert, export, ExportFormat, Options};
//!
//! let bytes = std::fs::read("market.xlsx")?;
//! let result = convert(&bytes, "market.xlsx", bytes.len() as u64, &Options::default())?;
//! let csv = export(&result, ExportFormat::Csv)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod error;
mod helpers;

pub mod export;
pub mod flatten;
pub mod metric;
pub mod semantic;
pub mod spreadsheet;
pub mod table;

pub use error::ConversionError;
pub use export::{export, output_file_name, write_to_dir, ExportError, ExportFormat};
pub use flatten::{convert, flatten_sheets, ConversionResult, FlatRow, Options, ProcessingEvent, Summary};
pub use semantic::Level;
pub use spreadsheet::{read_workbook, Cell, Criteria, RawSheet};
