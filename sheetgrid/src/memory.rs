//! In-memory worksheet.
//!
//! Borders are stored per edge rather than per cell, so the bottom of row 5
//! and the top of row 6 are the same line, which is how a spreadsheet draws
//! them. Formulas are kept as written and never evaluated, so both reads
//! return them as [`CellValue::Formula`].

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use crate::{
    a1::CellRange,
    error::GridError,
    grid::{BorderStyle, Borders, CellValue, GridBackend},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// A recorded call, for asserting on the order of grid operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GridOperation {
    Read(CellRange),
    ReadFormulas(CellRange),
    Write(CellRange),
    Borders(CellRange),
}

#[derive(Default)]
struct GridState {
    // (row, column) -> value
    cells: BTreeMap<(u32, u32), CellValue>,
    // (row, column) -> line above that cell
    horizontal: HashMap<(u32, u32), BorderStyle>,
    // (row, column) -> line left of that cell
    vertical: HashMap<(u32, u32), BorderStyle>,
    operations: Vec<GridOperation>,
}

#[derive(Default)]
pub struct MemoryGrid {
    state: Mutex<GridState>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GridState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Put a value into a cell without recording an operation.
    pub fn set(&self, column: u32, row: u32, value: impl Into<CellValue>) {
        let value = value.into();
        let mut state = self.lock();
        if value.is_empty() {
            state.cells.remove(&(row, column));
        } else {
            state.cells.insert((row, column), value);
        }
    }

    pub fn cell(&self, column: u32, row: u32) -> Option<CellValue> {
        self.lock().cells.get(&(row, column)).cloned()
    }

    /// Formatted text of a cell, empty when unset.
    pub fn text(&self, column: u32, row: u32) -> String {
        self.cell(column, row)
            .map(|value| value.formatted())
            .unwrap_or_default()
    }

    pub fn border(&self, column: u32, row: u32, side: Side) -> BorderStyle {
        let state = self.lock();
        let edge = match side {
            Side::Top => state.horizontal.get(&(row, column)),
            Side::Bottom => state.horizontal.get(&(row + 1, column)),
            Side::Left => state.vertical.get(&(row, column)),
            Side::Right => state.vertical.get(&(row, column + 1)),
        };
        edge.copied().unwrap_or_default()
    }

    pub fn operations(&self) -> Vec<GridOperation> {
        self.lock().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    fn last_row(state: &GridState) -> u32 {
        state.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    fn read_cells(&self, range: &CellRange, operation: GridOperation) -> Vec<Vec<CellValue>> {
        let mut state = self.lock();
        state.operations.push(operation);

        let last_row = range.end_row.unwrap_or_else(|| Self::last_row(&state));
        let mut rows = Vec::new();
        for row in range.start_row..=last_row {
            let mut cells: Vec<CellValue> = (range.start_column..=range.end_column)
                .map(|column| {
                    state
                        .cells
                        .get(&(row, column))
                        .cloned()
                        .unwrap_or(CellValue::Empty)
                })
                .collect();
            while cells.last().is_some_and(|cell| cell.is_empty()) {
                cells.pop();
            }
            rows.push(cells);
        }
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        rows
    }
}

fn put_edge(edges: &mut HashMap<(u32, u32), BorderStyle>, key: (u32, u32), style: BorderStyle) {
    if style == BorderStyle::None {
        edges.remove(&key);
    } else {
        edges.insert(key, style);
    }
}

#[async_trait::async_trait]
impl GridBackend for MemoryGrid {
    async fn read(&self, range: &CellRange) -> Result<Vec<Vec<CellValue>>, GridError> {
        Ok(self.read_cells(range, GridOperation::Read(*range)))
    }

    async fn read_formulas(&self, range: &CellRange) -> Result<Vec<Vec<CellValue>>, GridError> {
        Ok(self.read_cells(range, GridOperation::ReadFormulas(*range)))
    }

    async fn write(&self, range: &CellRange, values: Vec<Vec<CellValue>>) -> Result<(), GridError> {
        let mut state = self.lock();
        state.operations.push(GridOperation::Write(*range));

        for (i, row) in values.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                let key = (range.start_row + i as u32, range.start_column + j as u32);
                if value.is_empty() {
                    state.cells.remove(&key);
                } else {
                    state.cells.insert(key, value);
                }
            }
        }
        Ok(())
    }

    async fn set_borders(&self, range: &CellRange, borders: Borders) -> Result<(), GridError> {
        let Some(end_row) = range.end_row else {
            return Err(GridError::Invalid(format!(
                "borders need a closed range, got {}",
                range
            )));
        };
        let mut state = self.lock();
        state.operations.push(GridOperation::Borders(*range));

        let rows = range.start_row..=end_row;
        let columns = range.start_column..=range.end_column;

        for column in columns.clone() {
            if let Some(style) = borders.top {
                put_edge(&mut state.horizontal, (range.start_row, column), style);
            }
            if let Some(style) = borders.bottom {
                put_edge(&mut state.horizontal, (end_row + 1, column), style);
            }
            if let Some(style) = borders.inner_horizontal {
                for row in range.start_row + 1..=end_row {
                    put_edge(&mut state.horizontal, (row, column), style);
                }
            }
        }
        for row in rows {
            if let Some(style) = borders.left {
                put_edge(&mut state.vertical, (row, range.start_column), style);
            }
            if let Some(style) = borders.right {
                put_edge(&mut state.vertical, (row, range.end_column + 1), style);
            }
            if let Some(style) = borders.inner_vertical {
                for column in range.start_column + 1..=range.end_column {
                    put_edge(&mut state.vertical, (row, column), style);
                }
            }
        }
        Ok(())
    }
}
