//! Row semantic extraction: labels, segment axes, units and geography.
pub mod geography;
pub mod label;
pub mod rules;
pub mod segments;
pub mod units;

pub use geography::{Geography, Level};

use crate::spreadsheet::{Cell, RawSheet};
use crate::table::header::sheet_years;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Rows at the top of a sheet searched for table titles
pub const TITLE_SCAN_ROWS: usize = 15;
pub const TITLE_MIN_CHARS: usize = 15;

static TITLE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)market|forecast|estimates").expect("Hardcode regex pattern"));

static TITLE_BY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bby\b").expect("Hardcode regex pattern"));

/// Why a data row produced no flattened row.
#[derive(Debug, Error, PartialEq)]
pub enum RowRejected {
    #[error("No label in the leading cells")]
    MissingLabel,
    #[error("Label '{label}' is a table artifact ({reason})")]
    Artifact { label: String, reason: &'static str },
    #[error("Row '{0}' has no year values")]
    NoValues(String),
}

/// Facts gathered once per sheet and shared by all of its rows.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetContext {
    pub name: String,
    pub titles: Vec<String>,
    pub units: String,
    /// Every year mentioned in the sheet, ascending
    pub years: Vec<u16>,
}

fn is_title(text: &str) -> bool {
    let text = text.trim();
    text.chars().count() >= TITLE_MIN_CHARS && TITLE_KEYWORD.is_match(text) && TITLE_BY.is_match(text)
}

impl SheetContext {
    pub fn scan(sheet: &RawSheet, default_units: &str) -> Self {
        let titles: Vec<String> = sheet
            .grid
            .iter()
            .take(TITLE_SCAN_ROWS)
            .flatten()
            .filter_map(Cell::as_text)
            .filter(|text| is_title(text))
            .map(|text| text.trim().to_string())
            .collect();
        let units = units::sheet_units(sheet, &titles, default_units);
        SheetContext { name: sheet.name.clone(), years: sheet_years(sheet), titles, units }
    }

    /// First table title, else the sheet name.
    pub fn title(&self) -> &str {
        self.titles.first().unwrap_or(&self.name)
    }
}

/// Dimensions of one data row.
#[derive(Clone, Debug, PartialEq)]
pub struct RowSemantics {
    /// Offset of the label cell inside the row
    pub label_index: usize,
    pub product: String,
    pub segments: String,
    pub geography: Geography,
}

/// Extracts the label, axis and geography of a data row.
pub fn extract_row(context: &SheetContext, cells: &[Cell]) -> Result<RowSemantics, RowRejected> {
    let (label_index, label) = label::extract_label(cells).ok_or(RowRejected::MissingLabel)?;
    if let Some(reason) = label::rejection(label) {
        return Err(RowRejected::Artifact { label: label.to_string(), reason });
    }
    let product = units::strip_units(label);
    if product.is_empty() {
        return Err(RowRejected::MissingLabel);
    }

    let candidates = std::iter::once(label)
        .chain(cells.iter().filter_map(Cell::as_text))
        .chain(context.titles.iter().map(String::as_str))
        .chain(std::iter::once(context.name.as_str()));
    let segments = segments::first_axis(candidates).unwrap_or_default();
    let geography = geography::classify(label, &context.name, &segments);

    Ok(RowSemantics { label_index, product, segments, geography })
}
