//! Table region detection.
//!
//! The grid is scanned top-to-bottom, left-to-right. Every unclaimed run of
//! at least two contiguous non-empty cells is a header candidate; data rows
//! below it are collected until `gap_tolerance` consecutive empty rows are
//! seen. Accepted regions claim their rectangle so that no cell belongs to
//! two tables.
use crate::spreadsheet::Cell;
use crate::spreadsheet::RawSheet;
use crate::table::header::{classify_headers, is_data_row, is_year_band, year_of_cell};
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Consecutive empty rows that close a table
    pub gap_tolerance: usize,
    /// Regions must score strictly above this
    pub min_confidence: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { gap_tolerance: 3, min_confidence: 0.3 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegionRow {
    /// 0-based row index in the sheet grid
    pub source_row: usize,
    /// Cells spanning `start_col..=end_col`
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRegion {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub headers: Vec<String>,
    pub header_cells: Vec<Cell>,
    pub rows: Vec<RegionRow>,
    pub confidence: f64,
}

impl TableRegion {
    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

/// Confidence of a candidate region, capped at 1.0.
///
/// `0.3·valid_header_fraction + 0.4·data_density`, plus 0.15 with at least two
/// data rows and 0.15 with at least three header columns.
pub fn confidence(valid_header_fraction: f64, data_density: f64, data_rows: usize, header_cols: usize) -> f64 {
    let mut score = 0.3 * valid_header_fraction + 0.4 * data_density;
    if data_rows >= 2 {
        score += 0.15;
    }
    if header_cols >= 3 {
        score += 0.15;
    }
    score.min(1.0)
}

fn is_valid_header(cell: &Cell) -> bool {
    year_of_cell(cell).is_some() || (matches!(cell, Cell::Text(_)) && cell.to_number().is_none())
}

/// Every year of `band` sits above a figure (or a blank) of `row`.
fn years_over_figures(band: &[Cell], row: &[Cell]) -> bool {
    band.iter()
        .zip(row)
        .all(|(year, figure)| year_of_cell(year).is_none() || figure.is_empty() || figure.to_number().is_some())
}

struct Detector<'a> {
    sheet: &'a RawSheet,
    config: &'a DetectorConfig,
    claimed: Vec<Vec<bool>>,
}

impl<'a> Detector<'a> {
    fn new(sheet: &'a RawSheet, config: &'a DetectorConfig) -> Self {
        let claimed = vec![vec![false; sheet.col_count()]; sheet.row_count()];
        Self { sheet, config, claimed }
    }

    fn is_free(&self, row: usize, col: usize) -> bool {
        !self.claimed[row][col] && !self.sheet.get(row, col).is_empty()
    }

    fn scan(mut self) -> Vec<TableRegion> {
        let mut regions = Vec::new();
        for row in 0..self.sheet.row_count() {
            let mut col = 0;
            while col < self.sheet.col_count() {
                if !self.is_free(row, col) {
                    col += 1;
                    continue;
                }
                let mut end = col;
                while end + 1 < self.sheet.col_count() && self.is_free(row, end + 1) {
                    end += 1;
                }
                if end > col {
                    if let Some(region) = self.candidate(row, col, end) {
                        self.claim(&region);
                        regions.push(region);
                    }
                }
                col = end + 1;
            }
        }
        regions
    }

    /// Unclaimed year band spanning `start_col..=end_col` directly above `row`.
    fn band_above(&self, row: usize, start_col: usize, end_col: usize) -> Option<Vec<Cell>> {
        let above = row.checked_sub(1)?;
        if (start_col..=end_col).any(|col| self.claimed[above][col]) {
            return None;
        }
        let cells = &self.sheet.grid[above][start_col..=end_col];
        is_year_band(cells).then(|| cells.to_vec())
    }

    fn candidate(&self, row: usize, start_col: usize, end_col: usize) -> Option<TableRegion> {
        let first_cells = self.sheet.grid[row][start_col..=end_col].to_vec();
        if is_year_band(&first_cells) {
            return None;
        }

        // A labelled row of figures under a year band is data, and the band
        // supplies the year columns.
        let (start_row, header_cells, mut rows) = match self.band_above(row, start_col, end_col) {
            Some(band) if is_data_row(&first_cells) && years_over_figures(&band, &first_cells) => {
                (row - 1, band, vec![RegionRow { source_row: row, cells: first_cells }])
            }
            _ => (row, first_cells, Vec::new()),
        };
        let mut gap = 0;
        for data_row in row + 1..self.sheet.row_count() {
            if (start_col..=end_col).any(|col| self.claimed[data_row][col]) {
                break;
            }
            let cells = &self.sheet.grid[data_row][start_col..=end_col];
            if cells.iter().all(Cell::is_empty) {
                gap += 1;
                if gap >= self.config.gap_tolerance {
                    break;
                }
                continue;
            }
            gap = 0;
            rows.push(RegionRow { source_row: data_row, cells: cells.to_vec() });
        }
        let last_row = rows.last()?.source_row;

        let width = header_cells.len();
        let valid = header_cells.iter().filter(|cell| is_valid_header(cell)).count() as f64 / width as f64;
        let filled: usize = rows.iter().map(|data| data.cells.iter().filter(|cell| !cell.is_empty()).count()).sum();
        let density = filled as f64 / (rows.len() * width) as f64;
        let score = confidence(valid, density, rows.len(), width);

        debug!("Candidate region at row {} cols {}..={} scored {:.3}", row, start_col, end_col, score);
        if score <= self.config.min_confidence {
            return None;
        }
        Some(TableRegion {
            start_row,
            end_row: last_row,
            start_col,
            end_col,
            headers: header_cells.iter().map(Cell::to_string).collect(),
            header_cells,
            rows,
            confidence: score,
        })
    }

    fn claim(&mut self, region: &TableRegion) {
        for row in region.start_row..=region.end_row {
            for col in region.start_col..=region.end_col {
                self.claimed[row][col] = true;
            }
        }
    }
}

/// Candidate regions accepted by the confidence threshold, in scan order.
pub fn detect_regions(sheet: &RawSheet, config: &DetectorConfig) -> Vec<TableRegion> {
    Detector::new(sheet, config).scan()
}

fn same_header_texts(left: &TableRegion, right: &TableRegion) -> bool {
    left.headers.iter().zip(&right.headers).all(|(l, r)| l.trim().eq_ignore_ascii_case(r.trim()))
}

/// How `fragment` can join `primary`, if at all.
enum Join {
    /// Repeated header; only the data rows move over
    DropHeader,
    /// Headerless fragment whose first row is a labelled row of figures
    KeepHeader,
}

fn join(primary: &TableRegion, fragment: &TableRegion) -> Option<Join> {
    if primary.width() != fragment.width() {
        return None;
    }
    let primary_layout = classify_headers(&primary.headers);
    let fragment_layout = classify_headers(&fragment.headers);
    match (primary_layout.has_years(), fragment_layout.has_years()) {
        (true, true) if primary_layout.years() == fragment_layout.years() => Some(Join::DropHeader),
        (true, false) if is_data_row(&fragment.header_cells) => Some(Join::KeepHeader),
        (false, false) if same_header_texts(primary, fragment) => Some(Join::DropHeader),
        _ => None,
    }
}

/// Merges compatible regions under the highest-confidence header.
///
/// Merged rows keep sheet order. Output regions are ordered by position.
pub fn merge_regions(regions: Vec<TableRegion>) -> Vec<TableRegion> {
    let mut ranked = regions;
    ranked.sort_by(|left, right| right.confidence.total_cmp(&left.confidence));

    let mut merged: Vec<TableRegion> = Vec::new();
    'fragments: for fragment in ranked {
        for primary in merged.iter_mut() {
            let Some(kind) = join(primary, &fragment) else {
                continue;
            };
            debug!("Merging region at row {} into region at row {}", fragment.start_row, primary.start_row);
            if let Join::KeepHeader = kind {
                primary.rows.push(RegionRow { source_row: fragment.start_row, cells: fragment.header_cells });
            }
            primary.rows.extend(fragment.rows);
            primary.rows.sort_by_key(|row| row.source_row);
            primary.start_row = primary.start_row.min(fragment.start_row);
            primary.end_row = primary.end_row.max(fragment.end_row);
            continue 'fragments;
        }
        merged.push(fragment);
    }
    merged.sort_by_key(|region| (region.start_row, region.start_col));
    merged
}

/// Whole-row table used when nothing passes detection.
///
/// The header is the first row holding any text that is not a year band;
/// every later non-empty row is data.
pub fn fallback_region(sheet: &RawSheet) -> Option<TableRegion> {
    let header_row = sheet
        .grid
        .iter()
        .position(|row| row.iter().any(|cell| matches!(cell, Cell::Text(_))) && !is_year_band(row))?;
    let rows: Vec<RegionRow> = sheet.grid[header_row + 1..]
        .iter()
        .enumerate()
        .filter(|(_, cells)| cells.iter().any(|cell| !cell.is_empty()))
        .map(|(offset, cells)| RegionRow { source_row: header_row + 1 + offset, cells: cells.clone() })
        .collect();
    let header_cells = sheet.grid[header_row].clone();
    Some(TableRegion {
        start_row: header_row,
        end_row: rows.last().map_or(header_row, |row| row.source_row),
        start_col: 0,
        end_col: sheet.col_count().saturating_sub(1),
        headers: header_cells.iter().map(Cell::to_string).collect(),
        header_cells,
        rows,
        confidence: 0.0,
    })
}

/// Detected and merged tables of a sheet, or the fallback table when none qualify.
///
/// The flag tells whether the fallback was used.
pub fn find_tables(sheet: &RawSheet, config: &DetectorConfig) -> (Vec<TableRegion>, bool) {
    let regions = merge_regions(detect_regions(sheet, config));
    if !regions.is_empty() {
        return (regions, false);
    }
    (fallback_region(sheet).into_iter().collect(), true)
}
