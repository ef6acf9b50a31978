//! Year values and CAGR of a data row.
use crate::spreadsheet::Cell;
use crate::table::header::HeaderLayout;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Year → formatted value; keys are unique and ordered.
pub type YearValues = BTreeMap<u16, String>;

/// Canonical year axis always present in a flattened row
pub const CANONICAL_YEARS: RangeInclusive<u16> = 2021..=2034;

/// Numbers (including numeric text) to 2 decimals; other text passes through.
pub fn format_value(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        _ => match cell.to_number() {
            Some(number) => Some(format!("{:.2}", number)),
            None => cell.as_text().map(|text| text.trim().to_string()),
        },
    }
}

/// Values read from the year columns of a header layout.
pub fn values_by_column(cells: &[Cell], layout: &HeaderLayout) -> YearValues {
    layout
        .year_columns
        .iter()
        .filter_map(|column| {
            let value = cells.get(column.index).and_then(format_value)?;
            Some((column.year, value))
        })
        .collect()
}

/// Numeric cells after the label assigned in order to the sheet's years.
pub fn values_by_position(cells: &[Cell], label_index: usize, years: &[u16]) -> YearValues {
    let numbers = cells.iter().skip(label_index + 1).filter_map(Cell::to_number);
    years.iter().copied().zip(numbers).map(|(year, number)| (year, format!("{:.2}", number))).collect()
}

/// Compound annual growth rate in percent between the first and last populated years.
///
/// `None` with fewer than two years, a non-positive first value, a
/// non-numeric end value, or a non-finite result.
pub fn cagr(values: &YearValues) -> Option<f64> {
    let (&first_year, first) = values.first_key_value()?;
    let (&last_year, last) = values.last_key_value()?;
    if last_year == first_year {
        return None;
    }
    let first: f64 = first.parse().ok()?;
    let last: f64 = last.parse().ok()?;
    if first <= 0.0 {
        return None;
    }
    let rate = ((last / first).powf(1.0 / f64::from(last_year - first_year)) - 1.0) * 100.0;
    rate.is_finite().then_some(rate)
}

/// CAGR to 2 decimals, or an empty string when undefined.
pub fn format_cagr(values: &YearValues) -> String {
    cagr(values).map(|rate| format!("{:.2}", rate)).unwrap_or_default()
}

/// Values spread over the canonical axis; axis years without data are `""`.
pub fn on_axis(values: YearValues, axis: RangeInclusive<u16>) -> YearValues {
    let mut row: YearValues = axis.map(|year| (year, String::new())).collect();
    row.extend(values);
    row
}
