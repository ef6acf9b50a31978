use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::RawCell;
use crate::spreadsheet::SpreadsheetError;
use serde::Serialize;

/// Largest dense grid (rows × columns) a sheet may span.
pub(crate) const MAX_GRID_CELLS: usize = 5_000_000;

/// Cells of one worksheet collected while streaming its XML part.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells in document order
    pub(crate) cells: Vec<RawCell>,
    /// Row limit for data extraction
    limit: Option<usize>,
    /// Actual data range (determined from cell data)
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(name: &str, limit: Option<usize>) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            limit,
            row_upper_bound: None,
            col_upper_bound: None,
        }
    }

    pub(super) fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Checks if a row exceeds the row limit.
    pub(super) fn after_row_upper_bound(&self, row: usize) -> bool {
        self.limit.map(|limit| row >= limit).unwrap_or(false)
    }

    /// Checks that a cell at (row, col) keeps the data range within [`MAX_GRID_CELLS`].
    pub(super) fn ensure_fits(&self, row: usize, col: usize) -> Result<(), SpreadsheetError> {
        let rows = self.row_upper_bound.map_or(row, |bound| bound.max(row)).saturating_add(1);
        let cols = self.col_upper_bound.map_or(col, |bound| bound.max(col)).saturating_add(1);
        if rows.saturating_mul(cols) > MAX_GRID_CELLS {
            return Err(SpreadsheetError::GridTooLargeError {
                sheet: self.name.clone(),
                rows,
                cols,
                limit: MAX_GRID_CELLS,
            });
        }
        Ok(())
    }

    /// Adds a cell to the sheet, updating the data range.
    pub(super) fn push(&mut self, cell: RawCell) -> Result<(), SpreadsheetError> {
        self.ensure_fits(cell.row, cell.col)?;
        if self.row_upper_bound.map(|bound| bound < cell.row).unwrap_or(true) {
            self.row_upper_bound = Some(cell.row);
        }
        if self.col_upper_bound.map(|bound| bound < cell.col).unwrap_or(true) {
            self.col_upper_bound = Some(cell.col);
        }
        self.cells.push(cell);
        Ok(())
    }

    /// Lays the collected cells out as a dense grid anchored at A1.
    ///
    /// Cells that resolve to blanks still occupy their slot, and a later cell
    /// written to an occupied slot (repeated ODS ranges) overwrites it.
    pub(crate) fn into_raw_sheet(self, shared_strings: &[String]) -> RawSheet {
        let rows = self.row_upper_bound.map(|bound| bound + 1).unwrap_or(0);
        let cols = self.col_upper_bound.map(|bound| bound + 1).unwrap_or(0);
        let mut grid = vec![vec![Cell::Empty; cols]; rows];
        for cell in &self.cells {
            grid[cell.row][cell.col] = cell.resolve(shared_strings);
        }
        RawSheet { name: self.name, grid }
    }
}

/// One worksheet decoded into a dense rows × columns grid of scalar cells.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawSheet {
    pub name: String,
    pub grid: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Builds a sheet from rows of cells, padding short rows with blanks.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let grid = rows
            .into_iter()
            .map(|mut row| {
                row.resize(cols, Cell::Empty);
                row
            })
            .collect();
        RawSheet { name: name.into(), grid }
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn col_count(&self) -> usize {
        self.grid.first().map(Vec::len).unwrap_or(0)
    }

    /// Cell at (row, col); out-of-range positions read as blank.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.grid.get(row).and_then(|cells| cells.get(col)).unwrap_or(EMPTY)
    }

    pub fn is_empty(&self) -> bool {
        self.grid.iter().all(|row| row.iter().all(Cell::is_empty))
    }
}
