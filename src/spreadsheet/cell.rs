use crate::error::FlattenerError;
use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Display;

/// Storage kinds of cells as they appear inside workbook XML.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 1/0
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// ISO 8601 duration strings
    IsoDuration,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values (#DIV/0!, #N/A, ...)
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format codes to determine cell type.
    /// Quoted literals, escapes and bracketed sections (colors, locales) are skipped.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A cell as decoded from the workbook, before shared strings are resolved.
#[derive(Clone, Debug)]
pub(crate) struct RawCell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Serialized value; a shared string index for `CellType::SharedString`
    pub(crate) value: String,
}

impl RawCell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the stored value into the engine's closed cell representation.
    ///
    /// Date and time formatted numbers are rendered as ISO text so that a
    /// `yyyy`-formatted header still carries its year; error cells become empty.
    pub(crate) fn resolve(&self, shared_strings: &[String]) -> Cell {
        match self.kind {
            CellType::Empty | CellType::Error => Cell::Empty,
            CellType::Boolean => Cell::text(if self.value == "1" { "TRUE" } else { "FALSE" }),
            CellType::Number => match self.value.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => Cell::Number(number),
                _ => Cell::text(self.value.as_str()),
            },
            CellType::NumberDate1900 | CellType::NumberDate1904 => {
                let is_1904 = self.kind == CellType::NumberDate1904;
                self.render(to_date_string(&self.value, is_1904))
            }
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => {
                let is_1904 = self.kind == CellType::NumberDateTime1904;
                self.render(to_datetime_string(&self.value, is_1904))
            }
            CellType::NumberTime1900 | CellType::NumberTime1904 => self.render(to_time_string(&self.value)),
            CellType::IsoDateTime => Cell::text(self.value.replace('T', " ")),
            CellType::IsoDuration => Cell::text(
                self.value
                    .replace("PT", "")
                    .replace('H', ":")
                    .replace('M', ":")
                    .replace('S', ""),
            ),
            CellType::InlineString => Cell::text(self.value.as_str()),
            CellType::SharedString => self.value
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .map(|text| Cell::text(text.as_str()))
                .unwrap_or(Cell::Empty),
        }
    }

    /// Falls back to the raw number when a date conversion fails.
    fn render(&self, text: Result<String, FlattenerError>) -> Cell {
        match text {
            Ok(text) => Cell::Text(text),
            Err(error) => {
                tracing::debug!(reference = %self.reference(), %error, "keeping date cell as number");
                match self.value.parse::<f64>() {
                    Ok(number) => Cell::Number(number),
                    Err(_) => Cell::text(self.value.as_str()),
                }
            }
        }
    }
}

/// A scalar spreadsheet value.
///
/// Readers normalize every decoded value into one of these three shapes, so
/// blanks are always `Empty` and never a missing cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Builds a text cell; whitespace-only text is treated as blank.
    pub fn text(value: impl Into<String>) -> Cell {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric value of the cell, coercing numeric text such as `"1,204.50"`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Number(number) => Some(*number),
            Cell::Text(text) => {
                let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
            }
            Cell::Empty => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => write!(f, "{}", *number as i64),
            Cell::Number(number) => write!(f, "{}", number),
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::text(value)
    }
}

/// Converts Excel numeric date to ISO date string.
/// Handles Lotus 1-2-3 leap year bug for 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, FlattenerError> {
    let days = value.parse::<f64>()?.trunc() as i64;
    let duration = Duration::days(
        days + if is_1904 {
            1462
        } else if days < 60 {
            1
        } else {
            0
        },
    );
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .ok_or_else(|| FlattenerError::WithContextError("invalid date epoch".to_owned()))?;
    Ok((epoch + duration).format("%Y-%m-%d").to_string())
}

/// Converts Excel numeric time (fraction of a day) to ISO time string.
fn to_time_string(value: &str) -> Result<String, FlattenerError> {
    let factor = value.parse::<f64>()?.fract();
    let mut remaining = (factor * 86_400_000f64).round() as i64;
    let milliseconds = remaining % 1_000;
    remaining /= 1_000;
    let seconds = remaining % 60;
    remaining /= 60;
    let minutes = remaining % 60;
    let hours = remaining / 60;
    Ok(if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    })
}

/// Converts Excel numeric datetime to ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, FlattenerError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}
