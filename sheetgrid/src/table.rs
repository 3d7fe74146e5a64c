//! A named, row-based table living inside a worksheet.
//!
//! Every table in the workbook (category columns, the account block, the
//! journal halves) is a contiguous run of rows starting at a fixed row. The
//! first column holds the name used for lookups. Deleting a row moves every
//! row below it up by one, so there are never gaps.

use crate::{
    a1::CellRange,
    error::GridError,
    grid::{BorderStyle, Borders, CellValue, GridBackend},
    names::same_name,
};

/// Snapshot of a table region plus the operations that keep the sheet and
/// the snapshot in step.
#[derive(Debug, Clone)]
pub struct TableRegion {
    first_column: u32,
    width: u32,
    first_row: u32,
    rows: Vec<Vec<CellValue>>,
}

impl TableRegion {
    /// Read the table. Rows end at the first row whose name cell is empty.
    pub async fn load(
        grid: &dyn GridBackend,
        first_column: u32,
        width: u32,
        first_row: u32,
    ) -> Result<Self, GridError> {
        let range = CellRange::open(first_column, width, first_row);
        log::debug!("Loading table range={}", range);
        let rows = grid
            .read(&range)
            .await?
            .into_iter()
            .take_while(|row| row.first().is_some_and(|name| !name.is_empty()))
            .map(|mut row| {
                row.resize(width as usize, CellValue::Empty);
                row
            })
            .collect();
        Ok(Self {
            first_column,
            width,
            first_row,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(|row| row.as_slice())
    }

    /// Names in sheet order.
    pub fn names(&self) -> Vec<String> {
        self.rows.iter().map(|row| row[0].formatted()).collect()
    }

    /// Position of a row by name, case-insensitive.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| same_name(&row[0].formatted(), name))
    }

    /// 1-based sheet row of a table row.
    pub fn sheet_row(&self, index: usize) -> u32 {
        self.first_row + index as u32
    }

    /// Current contents of table rows `from..=to`, formulas included, padded
    /// to the table width so they can be written back elsewhere.
    async fn contents(
        &self,
        grid: &dyn GridBackend,
        from: usize,
        to: usize,
    ) -> Result<Vec<Vec<CellValue>>, GridError> {
        let range = CellRange::rows(
            self.first_column,
            self.width,
            self.sheet_row(from),
            self.sheet_row(to),
        );
        let mut rows = grid.read_formulas(&range).await?;
        rows.resize(to - from + 1, Vec::new());
        for row in rows.iter_mut() {
            row.resize(self.width as usize, CellValue::Empty);
        }
        Ok(rows)
    }

    /// Append a row right after the last one. Returns its index.
    pub async fn push(
        &mut self,
        grid: &dyn GridBackend,
        mut row: Vec<CellValue>,
    ) -> Result<usize, GridError> {
        row.resize(self.width as usize, CellValue::Empty);
        let index = self.rows.len();
        let range = CellRange::row(self.first_column, self.width, self.sheet_row(index));
        log::debug!("Appending row range={}", range);
        grid.write(&range, vec![row.clone()]).await?;
        self.rows.push(row);
        Ok(index)
    }

    /// Overwrite one cell of a row; `offset` counts from the name column.
    pub async fn set_cell(
        &mut self,
        grid: &dyn GridBackend,
        index: usize,
        offset: u32,
        value: CellValue,
    ) -> Result<(), GridError> {
        if index >= self.rows.len() || offset >= self.width {
            return Err(GridError::Invalid(format!(
                "cell {}:{} is outside of the table",
                index, offset
            )));
        }
        let range = CellRange::cell(self.first_column + offset, self.sheet_row(index));
        log::debug!("Updating cell range={}", range);
        grid.write(&range, vec![vec![value.clone()]]).await?;
        self.rows[index][offset as usize] = value;
        Ok(())
    }

    /// Delete a row and close the gap: rows below move up by one and the
    /// vacated last row is cleared. Returns the removed row.
    pub async fn remove(
        &mut self,
        grid: &dyn GridBackend,
        index: usize,
    ) -> Result<Vec<CellValue>, GridError> {
        if index >= self.rows.len() {
            return Err(GridError::Invalid(format!(
                "row {} is outside of the table",
                index
            )));
        }
        let last = self.rows.len() - 1;
        if index < last {
            let range = CellRange::rows(
                self.first_column,
                self.width,
                self.sheet_row(index),
                self.sheet_row(last - 1),
            );
            let moved = self.contents(grid, index + 1, last).await?;
            log::debug!("Shifting rows up range={}", range);
            grid.write(&range, moved).await?;
        }
        let vacated = CellRange::row(self.first_column, self.width, self.sheet_row(last));
        log::debug!("Clearing vacated row range={}", vacated);
        grid.write(&vacated, vec![vec![CellValue::Empty; self.width as usize]])
            .await?;
        Ok(self.rows.remove(index))
    }

    /// Insert a row on top: every row moves down by one and the new row
    /// takes the first row.
    pub async fn prepend(
        &mut self,
        grid: &dyn GridBackend,
        mut row: Vec<CellValue>,
    ) -> Result<(), GridError> {
        row.resize(self.width as usize, CellValue::Empty);
        if !self.rows.is_empty() {
            let range = CellRange::rows(
                self.first_column,
                self.width,
                self.sheet_row(1),
                self.sheet_row(self.rows.len()),
            );
            let moved = self.contents(grid, 0, self.rows.len() - 1).await?;
            log::debug!("Shifting rows down range={}", range);
            grid.write(&range, moved).await?;
        }
        let top = CellRange::row(self.first_column, self.width, self.first_row);
        grid.write(&top, vec![row.clone()]).await?;
        self.rows.insert(0, row);
        Ok(())
    }
}

/// The outline drawn around a table: outer edges, inner column separators
/// and a bottom edge under one trailing empty row.
#[derive(Debug, Clone, Copy)]
pub struct BoxFrame {
    pub first_column: u32,
    pub width: u32,
    pub first_row: u32,
    pub outer: BorderStyle,
    pub inner: BorderStyle,
}

impl BoxFrame {
    fn body(&self) -> Borders {
        Borders {
            left: Some(self.outer),
            right: Some(self.outer),
            inner_vertical: Some(self.inner),
            bottom: Some(BorderStyle::None),
            ..Default::default()
        }
    }

    fn bottom(&self) -> Borders {
        Borders {
            left: Some(self.outer),
            right: Some(self.outer),
            inner_vertical: Some(self.inner),
            bottom: Some(self.outer),
            ..Default::default()
        }
    }

    fn row(&self, row: u32) -> CellRange {
        CellRange::row(self.first_column, self.width, row)
    }

    /// Extend the box by one row for a table that had `height` rows.
    pub async fn grow(&self, grid: &dyn GridBackend, height: usize) -> Result<(), GridError> {
        let row = self.first_row + height as u32;
        log::debug!("Growing box to row={}", row + 1);
        grid.set_borders(&self.row(row), self.body()).await?;
        grid.set_borders(&self.row(row + 1), self.bottom()).await
    }

    /// Pull the box in by one row for a table that had `height` rows.
    pub async fn shrink(&self, grid: &dyn GridBackend, height: usize) -> Result<(), GridError> {
        if height == 0 {
            return Ok(());
        }
        let row = self.first_row + height as u32;
        log::debug!("Shrinking box to row={}", row - 1);
        grid.set_borders(&self.row(row), Borders::erased()).await?;
        grid.set_borders(&self.row(row - 1), self.bottom()).await
    }

    /// Step the box from `from` rows to `to` rows.
    pub async fn resize(
        &self,
        grid: &dyn GridBackend,
        from: usize,
        to: usize,
    ) -> Result<(), GridError> {
        let mut height = from;
        while height < to {
            self.grow(grid, height).await?;
            height += 1;
        }
        while height > to {
            self.shrink(grid, height).await?;
            height -= 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{GridOperation, MemoryGrid, Side};

    fn seeded(names: &[&str]) -> MemoryGrid {
        let grid = MemoryGrid::new();
        for (i, name) in names.iter().enumerate() {
            grid.set(4, 4 + i as u32, *name);
            grid.set(5, 4 + i as u32, (i as f64 + 1.0) * 10.0);
        }
        grid
    }

    fn frame() -> BoxFrame {
        BoxFrame {
            first_column: 4,
            width: 3,
            first_row: 4,
            outer: BorderStyle::SolidMedium,
            inner: BorderStyle::Dotted,
        }
    }

    #[tokio::test]
    async fn test_load_stops_at_first_gap() {
        let grid = seeded(&["Cash", "Card"]);
        grid.set(4, 7, "Stray");
        let table = TableRegion::load(&grid, 4, 3, 4).await.unwrap();
        assert_eq!(table.names(), vec!["Cash", "Card"]);
        assert_eq!(table.row(0).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let grid = seeded(&["Cash", "Card"]);
        let table = TableRegion::load(&grid, 4, 3, 4).await.unwrap();
        assert_eq!(table.find("card"), Some(1));
        assert_eq!(table.find("CASH"), Some(0));
        assert_eq!(table.find("Bank"), None);
    }

    #[tokio::test]
    async fn test_push_writes_after_last_row() {
        let grid = seeded(&["Cash", "Card"]);
        let mut table = TableRegion::load(&grid, 4, 3, 4).await.unwrap();
        grid.clear_operations();

        let index = table
            .push(&grid, vec!["Bank".into(), 5.0.into(), true.into()])
            .await
            .unwrap();

        assert_eq!(index, 2);
        assert_eq!(
            grid.operations(),
            vec![GridOperation::Write(CellRange::row(4, 3, 6))]
        );
        assert_eq!(grid.text(4, 6), "Bank");
        assert_eq!(grid.text(6, 6), "TRUE");
    }

    #[tokio::test]
    async fn test_remove_middle_row_compacts() {
        let grid = seeded(&["Cash", "Card", "Bank", "Wallet"]);
        let mut table = TableRegion::load(&grid, 4, 3, 4).await.unwrap();
        grid.clear_operations();

        let removed = table.remove(&grid, 1).await.unwrap();

        assert_eq!(removed[0], CellValue::from("Card"));
        assert_eq!(
            grid.operations(),
            vec![
                GridOperation::ReadFormulas(CellRange::rows(4, 3, 6, 7)),
                GridOperation::Write(CellRange::rows(4, 3, 5, 6)),
                GridOperation::Write(CellRange::row(4, 3, 7)),
            ]
        );
        assert_eq!(grid.text(4, 4), "Cash");
        assert_eq!(grid.text(4, 5), "Bank");
        assert_eq!(grid.text(5, 5), "30");
        assert_eq!(grid.text(4, 6), "Wallet");
        assert_eq!(grid.text(5, 6), "40");
        assert_eq!(grid.cell(4, 7), None);
        assert_eq!(grid.cell(5, 7), None);

        let reloaded = TableRegion::load(&grid, 4, 3, 4).await.unwrap();
        assert_eq!(reloaded.names(), table.names());
    }

    #[tokio::test]
    async fn test_remove_last_row_only_clears() {
        let grid = seeded(&["Cash", "Card"]);
        let mut table = TableRegion::load(&grid, 4, 3, 4).await.unwrap();
        grid.clear_operations();

        table.remove(&grid, 1).await.unwrap();

        assert_eq!(
            grid.operations(),
            vec![GridOperation::Write(CellRange::row(4, 3, 5))]
        );
        assert_eq!(table.names(), vec!["Cash"]);
    }

    #[tokio::test]
    async fn test_remove_out_of_range() {
        let grid = seeded(&["Cash"]);
        let mut table = TableRegion::load(&grid, 4, 3, 4).await.unwrap();
        assert!(matches!(
            table.remove(&grid, 3).await,
            Err(GridError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_prepend_shifts_down() {
        let grid = MemoryGrid::new();
        grid.set(0, 3, "2024-01-02");
        grid.set(1, 3, "Food");
        grid.set(0, 4, "2024-01-01");
        grid.set(1, 4, "Rent");
        let mut table = TableRegion::load(&grid, 0, 5, 3).await.unwrap();

        table
            .prepend(&grid, vec!["2024-01-03".into(), "Taxi".into()])
            .await
            .unwrap();

        assert_eq!(grid.text(1, 3), "Taxi");
        assert_eq!(grid.text(1, 4), "Food");
        assert_eq!(grid.text(1, 5), "Rent");
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn test_shift_moves_formulas() {
        let grid = MemoryGrid::new();
        let dated = |day: u32| CellValue::Formula(format!("=DATE(2024, 1, {})", day));
        grid.set(0, 3, dated(2));
        grid.set(1, 3, "Food");
        grid.set(0, 4, dated(1));
        grid.set(1, 4, "Rent");
        let mut table = TableRegion::load(&grid, 0, 5, 3).await.unwrap();
        grid.clear_operations();

        table
            .prepend(&grid, vec![dated(3), "Taxi".into()])
            .await
            .unwrap();

        assert_eq!(
            grid.operations(),
            vec![
                GridOperation::ReadFormulas(CellRange::rows(0, 5, 3, 4)),
                GridOperation::Write(CellRange::rows(0, 5, 4, 5)),
                GridOperation::Write(CellRange::row(0, 5, 3)),
            ]
        );
        assert_eq!(grid.cell(0, 4), Some(dated(2)));
        assert_eq!(grid.cell(0, 5), Some(dated(1)));

        grid.clear_operations();
        table.remove(&grid, 0).await.unwrap();
        assert_eq!(
            grid.operations()[0],
            GridOperation::ReadFormulas(CellRange::rows(0, 5, 4, 5))
        );
        assert_eq!(grid.cell(0, 3), Some(dated(2)));
        assert_eq!(grid.cell(0, 4), Some(dated(1)));
        assert_eq!(grid.cell(0, 5), None);
    }

    #[tokio::test]
    async fn test_box_grow_and_shrink() {
        let grid = MemoryGrid::new();
        let frame = frame();

        frame.resize(&grid, 0, 2).await.unwrap();
        // rows 4 and 5 are data rows, row 6 is the trailing row
        assert_eq!(grid.border(4, 4, Side::Left), BorderStyle::SolidMedium);
        assert_eq!(grid.border(4, 4, Side::Right), BorderStyle::Dotted);
        assert_eq!(grid.border(6, 5, Side::Right), BorderStyle::SolidMedium);
        assert_eq!(grid.border(5, 4, Side::Bottom), BorderStyle::None);
        assert_eq!(grid.border(5, 5, Side::Bottom), BorderStyle::None);
        assert_eq!(grid.border(5, 6, Side::Bottom), BorderStyle::SolidMedium);

        frame.shrink(&grid, 2).await.unwrap();
        assert_eq!(grid.border(4, 6, Side::Left), BorderStyle::None);
        assert_eq!(grid.border(5, 6, Side::Bottom), BorderStyle::None);
        assert_eq!(grid.border(5, 5, Side::Bottom), BorderStyle::SolidMedium);
        assert_eq!(grid.border(4, 5, Side::Left), BorderStyle::SolidMedium);
    }

    #[tokio::test]
    async fn test_shrink_empty_box_is_noop() {
        let grid = MemoryGrid::new();
        frame().shrink(&grid, 0).await.unwrap();
        assert!(grid.operations().is_empty());
    }
}
