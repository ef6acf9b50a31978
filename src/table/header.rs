//! Header/year classification.
//!
//! A header cell is a year column when it is an integer in [1990, 2100] or
//! when its text holds a four digit `19xx`/`20xx` token in that range
//! (`"FY2024E"`, `"2024-01-01"`).
use crate::spreadsheet::Cell;
use crate::spreadsheet::RawSheet;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const MIN_YEAR: u16 = 1990;
pub const MAX_YEAR: u16 = 2100;

/// Maximal runs of ASCII digits
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("Hardcode regex pattern"));

fn in_range(year: i64) -> Option<u16> {
    if (MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year) {
        Some(year as u16)
    } else {
        None
    }
}

/// All `19xx`/`20xx` tokens of `text` that fall in the valid year range, in order of appearance.
pub fn years_in_text(text: &str) -> Vec<u16> {
    DIGIT_RUN
        .find_iter(text)
        .map(|token| token.as_str())
        .filter(|token| token.len() == 4 && (token.starts_with("19") || token.starts_with("20")))
        .filter_map(|token| token.parse::<i64>().ok().and_then(in_range))
        .collect()
}

/// Year denoted by a header text: direct integer parse first, then the first year token.
pub fn year_of_text(text: &str) -> Option<u16> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .and_then(in_range)
        .or_else(|| years_in_text(trimmed).into_iter().next())
}

pub fn year_of_cell(cell: &Cell) -> Option<u16> {
    match cell {
        Cell::Number(number) if number.fract() == 0.0 => in_range(*number as i64),
        Cell::Number(_) | Cell::Empty => None,
        Cell::Text(text) => year_of_text(text),
    }
}

/// Text that names something: neither a year nor a number.
pub fn is_label_text(cell: &Cell) -> bool {
    matches!(cell, Cell::Text(_)) && year_of_cell(cell).is_none() && cell.to_number().is_none()
}

/// Whether a row is a year band rather than a header.
///
/// More than half of the non-empty cells are years, and the row does not
/// open with a textual label. `["Segment", "2021", "2024"]` keeps its label
/// column and stays a header candidate; `["", 2021, 2022]` and
/// `["FY2021", "FY2022", "Notes"]` are bands.
pub fn is_year_band(cells: &[Cell]) -> bool {
    let leading_label = cells.iter().find(|cell| !cell.is_empty()).is_some_and(is_label_text);
    is_mostly_years(cells) && !leading_label
}

/// A labelled row of figures rather than a header.
///
/// The first non-empty cell is a label and more than half of the other
/// non-empty cells are numbers, without those numbers being mostly years.
pub fn is_data_row(cells: &[Cell]) -> bool {
    let mut filled = cells.iter().filter(|cell| !cell.is_empty());
    if !filled.next().is_some_and(is_label_text) {
        return false;
    }
    let rest: Vec<&Cell> = filled.collect();
    let numbers = rest.iter().filter(|cell| cell.to_number().is_some()).count();
    let years = rest.iter().filter(|cell| year_of_cell(cell).is_some()).count();
    numbers * 2 > rest.len() && years * 2 <= rest.len()
}

/// More than half of the non-empty cells are years.
pub fn is_mostly_years(cells: &[Cell]) -> bool {
    let (years, non_empty) = cells
        .iter()
        .filter(|cell| !cell.is_empty())
        .fold((0, 0), |(years, non_empty), cell| (years + year_of_cell(cell).is_some() as usize, non_empty + 1));
    years * 2 > non_empty
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YearColumn {
    /// Column offset inside the table
    pub index: usize,
    pub year: u16,
}

/// Year columns of a header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderLayout {
    /// Year columns ordered ascending by year
    pub year_columns: Vec<YearColumn>,
}

impl HeaderLayout {
    pub fn has_years(&self) -> bool {
        !self.year_columns.is_empty()
    }

    pub fn years(&self) -> BTreeSet<u16> {
        self.year_columns.iter().map(|column| column.year).collect()
    }
}

/// Classifies header texts; a repeated year keeps its first column.
pub fn classify_headers<S: AsRef<str>>(headers: &[S]) -> HeaderLayout {
    let mut layout = HeaderLayout::default();
    let mut seen = BTreeSet::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(year) = year_of_text(header.as_ref()).filter(|year| seen.insert(*year)) {
            layout.year_columns.push(YearColumn { index, year });
        }
    }
    layout.year_columns.sort_by_key(|column| column.year);
    layout
}

/// Every year mentioned anywhere in the sheet, ascending.
///
/// Year tokens are taken from all text cells; numeric cells only count in
/// rows that are mostly years, so that data values such as `2025.0` do not
/// masquerade as years.
pub fn sheet_years(sheet: &RawSheet) -> Vec<u16> {
    let mut years = BTreeSet::new();
    for row in &sheet.grid {
        let mostly_years = is_mostly_years(row);
        for cell in row {
            match cell {
                Cell::Text(text) => years.extend(years_in_text(text)),
                Cell::Number(_) if mostly_years => years.extend(year_of_cell(cell)),
                _ => (),
            }
        }
    }
    years.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_textual_years_agree() {
        assert_eq!(year_of_cell(&Cell::Number(2024.0)), Some(2024));
        assert_eq!(year_of_cell(&Cell::text("FY2024E")), Some(2024));
        assert_eq!(year_of_cell(&Cell::text("2024")), Some(2024));

        let numeric = classify_headers(&["Segment", "2021", "2024"]);
        let textual = classify_headers(&["Segment", "FY2021", "2024E"]);
        assert_eq!(numeric.year_columns, textual.year_columns);
        assert_eq!(numeric.year_columns[0].index, 1);
    }

    #[test]
    fn year_range_bounds() {
        assert_eq!(year_of_text("1990"), Some(1990));
        assert_eq!(year_of_text("2100"), Some(2100));
        assert_eq!(year_of_text("1989"), None);
        assert_eq!(year_of_text("2101"), None);
        assert_eq!(year_of_text("12021"), None);
        assert_eq!(year_of_text("120.50"), None);
        assert_eq!(year_of_cell(&Cell::Number(2021.5)), None);
    }

    #[test]
    fn first_in_range_token_wins() {
        assert_eq!(year_of_text("Forecast 1950 vs 2030"), Some(2030));
        assert_eq!(years_in_text("EV Market, 2021-2034 (USD Billion)"), vec![2021, 2034]);
        assert_eq!(year_of_text("2023-01-01"), Some(2023));
    }

    #[test]
    fn headers_sorted_by_year() {
        let layout = classify_headers(&["2030", "Product", "2021", "2025", "2021E"]);
        let years: Vec<u16> = layout.year_columns.iter().map(|column| column.year).collect();
        assert_eq!(years, vec![2021, 2025, 2030]);
        assert_eq!(layout.year_columns[0].index, 2);
        assert_eq!(layout.year_columns[2].index, 0);
    }

    #[test]
    fn year_bands() {
        assert!(is_year_band(&[Cell::Empty, Cell::Number(2021.0), Cell::Number(2022.0), Cell::Number(2023.0)]));
        assert!(is_year_band(&[Cell::text("FY2021"), Cell::text("FY2022"), Cell::text("Notes")]));
        assert!(is_year_band(&[Cell::text("2021-2034"), Cell::Number(2021.0)]));
        assert!(!is_year_band(&[Cell::text("Segment"), Cell::text("2021"), Cell::text("2024")]));
        assert!(!is_year_band(&[Cell::text("Region"), Cell::text("Share")]));
        assert!(!is_year_band(&[Cell::Number(12.0), Cell::Number(2021.0), Cell::text("x")]));
        assert!(!is_year_band(&[Cell::Empty, Cell::Empty]));
        assert!(is_mostly_years(&[Cell::text("Segment"), Cell::Number(2021.0), Cell::Number(2022.0)]));
    }

    #[test]
    fn data_rows() {
        assert!(is_data_row(&[Cell::text("Europe"), Cell::Number(1.0), Cell::Number(2.0)]));
        assert!(is_data_row(&[Cell::Empty, Cell::text("Japan"), Cell::text("5"), Cell::Number(2025.0), Cell::Number(6.0)]));
        assert!(!is_data_row(&[Cell::text("Region"), Cell::Number(2021.0), Cell::Number(2024.0)]));
        assert!(!is_data_row(&[Cell::text("Company"), Cell::text("Headquarters"), Cell::text("Founded")]));
        assert!(!is_data_row(&[Cell::Number(3.0), Cell::Number(4.0)]));
    }

    #[test]
    fn years_across_sheet() {
        let sheet = RawSheet::new("S", vec![
            vec![Cell::text("Market, 2021-2034")],
            vec![Cell::Empty, Cell::Number(2022.0), Cell::Number(2023.0)],
            vec![Cell::text("Europe"), Cell::Number(2025.0), Cell::Number(30.0)],
        ]);
        assert_eq!(sheet_years(&sheet), vec![2021, 2022, 2023, 2034]);
    }
}
