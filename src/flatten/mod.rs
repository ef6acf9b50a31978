//! # Flattener
//!
//! Drives a conversion run: every sheet goes through table detection, row
//! extraction and metric normalization, and the resulting rows are
//! deduplicated, numbered and summarized.
pub mod event;
pub mod row;

pub use event::ProcessingEvent;
pub use row::{FlatRow, CAGR_COLUMN, DIMENSION_COLUMNS};

use crate::error::ConversionError;
use crate::metric::{self, CANONICAL_YEARS};
use crate::semantic::{self, Level, RowRejected, SheetContext};
use crate::spreadsheet::{self, Criteria, RawSheet};
use crate::table::header::classify_headers;
use crate::table::region::{find_tables, DetectorConfig, TableRegion};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

/// Tuning of a conversion run.
#[derive(Clone, Debug)]
pub struct Options {
    pub criteria: Criteria,
    pub detector: DetectorConfig,
    /// Years always present in a flattened row
    pub canonical_years: RangeInclusive<u16>,
    /// Units used when a sheet names none
    pub default_units: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            criteria: Criteria::default(),
            detector: DetectorConfig::default(),
            canonical_years: CANONICAL_YEARS,
            default_units: "(USD Million)".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_rows: usize,
    pub count_per_level: BTreeMap<Level, usize>,
    /// Output column order: dimensions, years present in the data, CAGR
    pub columns: Vec<String>,
}

/// Terminal result of a conversion run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversionResult {
    pub rows: Vec<FlatRow>,
    pub summary: Summary,
    pub log: Vec<ProcessingEvent>,
}

/// Accumulates flattened rows sheet by sheet.
pub struct Flattener<'a> {
    options: &'a Options,
    rows: Vec<FlatRow>,
    seen: HashSet<(String, String, String, Level)>,
    log: Vec<ProcessingEvent>,
}

impl<'a> Flattener<'a> {
    pub fn new(options: &'a Options) -> Self {
        Flattener { options, rows: Vec::new(), seen: HashSet::new(), log: Vec::new() }
    }

    pub fn record(&mut self, event: ProcessingEvent) {
        match event {
            _ if event.is_warning() => warn!("{}", event),
            ProcessingEvent::TableDetected { .. }
            | ProcessingEvent::RowsRejected { .. }
            | ProcessingEvent::DuplicatesSkipped { .. } => debug!("{}", event),
            _ => info!("{}", event),
        }
        self.log.push(event);
    }

    /// Flattens one sheet; sheets without rows only leave a warning in the log.
    pub fn push_sheet(&mut self, sheet: &RawSheet) {
        self.record(ProcessingEvent::SheetStarted {
            sheet: sheet.name.clone(),
            rows: sheet.row_count(),
            cols: sheet.col_count(),
        });

        let context = SheetContext::scan(sheet, &self.options.default_units);
        let (regions, fallback) = find_tables(sheet, &self.options.detector);
        for region in &regions {
            let event = if fallback {
                ProcessingEvent::FallbackHeader { sheet: sheet.name.clone(), header_row: region.start_row }
            } else {
                ProcessingEvent::TableDetected {
                    sheet: sheet.name.clone(),
                    start_row: region.start_row,
                    end_row: region.end_row,
                    start_col: region.start_col,
                    end_col: region.end_col,
                    confidence: region.confidence,
                }
            };
            self.record(event);
        }

        let mut extracted = 0;
        let mut rejected = 0;
        let mut duplicates = 0;
        for region in &regions {
            for (source_row, result) in flatten_region(&context, region, self.options) {
                match result {
                    Ok(mut row) => {
                        if !self.seen.insert(row.identity()) {
                            duplicates += 1;
                            continue;
                        }
                        row.id = format!("{}_{}", sheet.name, self.rows.len() + 1);
                        self.rows.push(row);
                        extracted += 1;
                    }
                    Err(reason) => {
                        debug!("Row {} of {} rejected: {}", source_row, sheet.name, reason);
                        rejected += 1;
                    }
                }
            }
        }

        if rejected > 0 {
            self.record(ProcessingEvent::RowsRejected { sheet: sheet.name.clone(), count: rejected });
        }
        if duplicates > 0 {
            self.record(ProcessingEvent::DuplicatesSkipped { sheet: sheet.name.clone(), count: duplicates });
        }
        if extracted == 0 {
            self.record(ProcessingEvent::EmptySheet { sheet: sheet.name.clone() });
        } else {
            self.record(ProcessingEvent::SheetExtracted { sheet: sheet.name.clone(), rows: extracted });
        }
    }

    pub fn finish(mut self) -> ConversionResult {
        let summary = summarize(&self.rows);
        self.record(ProcessingEvent::Completed { total_rows: summary.total_rows });
        ConversionResult { rows: self.rows, summary, log: self.log }
    }
}

/// Flattened rows of one table, each paired with its source row index.
fn flatten_region(
    context: &SheetContext,
    region: &TableRegion,
    options: &Options,
) -> Vec<(usize, Result<FlatRow, RowRejected>)> {
    let layout = classify_headers(&region.headers);
    region
        .rows
        .iter()
        .map(|data| {
            let result = semantic::extract_row(context, &data.cells).and_then(|semantics| {
                let values = if layout.has_years() {
                    metric::values_by_column(&data.cells, &layout)
                } else {
                    metric::values_by_position(&data.cells, semantics.label_index, &context.years)
                };
                let row = FlatRow {
                    id: String::new(),
                    title: context.title().to_string(),
                    regions: semantics.geography.regions,
                    country: semantics.geography.country,
                    segments: semantics.segments,
                    units: context.units.clone(),
                    product: semantics.product,
                    cagr: metric::format_cagr(&values),
                    years: metric::on_axis(values, options.canonical_years.clone()),
                    source_sheet: context.name.clone(),
                    source_row: data.source_row,
                    level: semantics.geography.level,
                };
                if row.has_values() { Ok(row) } else { Err(RowRejected::NoValues(row.product)) }
            });
            (data.source_row, result)
        })
        .collect()
}

/// Row count, per-level counts and output columns of the flattened rows.
pub fn summarize(rows: &[FlatRow]) -> Summary {
    let mut count_per_level = BTreeMap::new();
    let mut years = BTreeSet::new();
    for row in rows {
        *count_per_level.entry(row.level).or_insert(0) += 1;
        years.extend(row.years.iter().filter(|(_, value)| !value.is_empty()).map(|(year, _)| *year));
    }
    let columns = DIMENSION_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain(years.iter().map(u16::to_string))
        .chain(std::iter::once(CAGR_COLUMN.to_string()))
        .collect();
    Summary { total_rows: rows.len(), count_per_level, columns }
}

/// Flattens already decoded sheets in order.
pub fn flatten_sheets(sheets: &[RawSheet], options: &Options) -> ConversionResult {
    let mut flattener = Flattener::new(options);
    for sheet in sheets {
        flattener.push_sheet(sheet);
    }
    flattener.finish()
}

/// Decodes a workbook and flattens all of its selected sheets.
///
/// Only an unreadable workbook fails; problems inside sheets and rows end up
/// in the log of the returned result.
pub fn convert(
    bytes: &[u8],
    file_name: &str,
    declared_size: u64,
    options: &Options,
) -> Result<ConversionResult, ConversionError> {
    let sheets = spreadsheet::read_workbook(bytes, file_name, declared_size, &options.criteria)?;
    info!("Converting {} with {} sheets", file_name, sheets.len());
    let mut flattener = Flattener::new(options);
    flattener.record(ProcessingEvent::WorkbookOpened {
        file_name: file_name.to_string(),
        declared_size,
        sheets: sheets.len(),
    });
    for sheet in &sheets {
        flattener.push_sheet(sheet);
    }
    Ok(flattener.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::Cell;

    fn t(text: &str) -> Cell {
        Cell::text(text)
    }

    fn ev_sheet() -> RawSheet {
        RawSheet::new("EV Market, By Region, 2021-2034 (USD Billion)", vec![
            vec![t("Segment"), t("2021"), t("2024")],
            vec![t("North America"), t("120.50"), t("210.75")],
        ])
    }

    #[test]
    fn end_to_end_regional_row() {
        let result = flatten_sheets(&[ev_sheet()], &Options::default());
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.id, "EV Market, By Region, 2021-2034 (USD Billion)_1");
        assert_eq!(row.segments, "Region");
        assert_eq!(row.product, "North America");
        assert_eq!(row.units, "(USD Billion)");
        assert_eq!(row.regions, "North America");
        assert_eq!(row.level, Level::Regional);
        assert_eq!(row.field("2021"), "120.50");
        assert_eq!(row.field("2024"), "210.75");
        assert_eq!(row.cagr, "20.48");
        assert_eq!(row.source_row, 1);
        assert_eq!(result.summary.columns, vec![
            "Title", "Regions", "Country", "Segments", "Units", "Product", "2021", "2024", "CAGR"
        ]);
    }

    #[test]
    fn duplicate_rows_collapse() {
        let sheet = RawSheet::new("Data", vec![
            vec![t("Segment"), t("2021"), t("2022")],
            vec![t("Hybrid"), Cell::Number(1.0), Cell::Number(2.0)],
            vec![t("Hybrid"), Cell::Number(3.0), Cell::Number(4.0)],
        ]);
        let result = flatten_sheets(&[sheet], &Options::default());
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].field("2021"), "1.00");
        assert!(result.log.contains(&ProcessingEvent::DuplicatesSkipped { sheet: "Data".into(), count: 1 }));
    }

    #[test]
    fn ids_run_across_sheets_and_empty_sheets_warn() {
        let notes = RawSheet::new("Notes", vec![vec![t("Prepared by the research team")]]);
        let mut second = ev_sheet();
        second.name = "Copy".into();
        let result = flatten_sheets(&[ev_sheet(), notes, second], &Options::default());
        let ids: Vec<&str> = result.rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["EV Market, By Region, 2021-2034 (USD Billion)_1", "Copy_2"]);
        assert!(result.log.contains(&ProcessingEvent::EmptySheet { sheet: "Notes".into() }));
        assert_eq!(result.log.last(), Some(&ProcessingEvent::Completed { total_rows: 2 }));
        assert_eq!(result.summary.total_rows, 2);
    }

    #[test]
    fn rejected_rows_are_counted() {
        let sheet = RawSheet::new("Data", vec![
            vec![t("Segment"), t("2021"), t("2022")],
            vec![t("Battery"), Cell::Number(1.0), Cell::Number(2.0)],
            vec![t("Total"), Cell::Number(3.0), Cell::Number(4.0)],
            vec![t("Fuel Cell"), Cell::Empty, Cell::Empty],
        ]);
        let result = flatten_sheets(&[sheet], &Options::default());
        assert_eq!(result.rows.len(), 1);
        assert!(result.log.contains(&ProcessingEvent::RowsRejected { sheet: "Data".into(), count: 2 }));
        assert_eq!(result.summary.count_per_level.get(&Level::Segment), Some(&1));
    }

    #[test]
    fn yearless_header_uses_sheet_years() {
        let sheet = RawSheet::new("Sales", vec![
            vec![t("Sales, 2019-2020")],
            vec![t("Country"), t("Q1"), t("Q2")],
            vec![t("Germany"), Cell::Number(5.0), Cell::Number(6.0)],
        ]);
        let result = flatten_sheets(&[sheet], &Options::default());
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.level, Level::Country);
        assert_eq!(row.regions, "Europe");
        assert_eq!(row.field("2019"), "5.00");
        assert_eq!(row.field("2020"), "6.00");
        assert_eq!(row.field("2021"), "");
        assert_eq!(row.cagr, "20.00");
        assert!(result.summary.columns.contains(&"2019".to_string()));
    }

    #[test]
    fn first_row_under_year_band_is_kept() {
        let sheet = RawSheet::new("Regions", vec![
            vec![Cell::Empty, Cell::Number(2021.0), Cell::Number(2022.0), Cell::Number(2023.0)],
            vec![t("Europe"), Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)],
            vec![t("Asia Pacific"), Cell::Number(4.0), Cell::Number(5.0), Cell::Number(6.0)],
            vec![t("Latin America"), Cell::Number(7.0), Cell::Number(8.0), Cell::Number(9.0)],
        ]);
        let result = flatten_sheets(&[sheet], &Options::default());
        let rows: Vec<(&str, &str, &str)> =
            result.rows.iter().map(|row| (row.product.as_str(), row.field("2021"), row.field("2023"))).collect();
        assert_eq!(rows, vec![("Europe", "1.00", "3.00"), ("Asia Pacific", "4.00", "6.00"), ("Latin America", "7.00", "9.00")]);
        assert_eq!(result.rows[0].source_row, 1);
        assert_eq!(result.rows[0].level, Level::Regional);
    }

    #[test]
    fn unrelated_text_table_adds_no_rows() {
        let sheet = RawSheet::new("Players", vec![
            vec![t("Region"), t("2021"), t("2024")],
            vec![t("Europe"), Cell::Number(10.0), Cell::Number(14.0)],
            vec![t("Asia Pacific"), Cell::Number(20.0), Cell::Number(30.0)],
            vec![],
            vec![],
            vec![],
            vec![t("Company"), t("Headquarters"), t("Founded")],
            vec![t("Tesla"), t("Austin"), t("Est. 2003")],
            vec![t("BYD"), t("Shenzhen"), t("Est. 1995")],
        ]);
        let result = flatten_sheets(&[sheet], &Options::default());
        let products: Vec<&str> = result.rows.iter().map(|row| row.product.as_str()).collect();
        assert_eq!(products, vec!["Europe", "Asia Pacific"]);
        assert!(result.rows.iter().all(|row| row.years.values().all(|value| value.is_empty() || value.parse::<f64>().is_ok())));
    }
}
