//! A1 notation for worksheet cells and ranges.
//!
//! Columns are 0-based internally (`0` is `A`), rows are 1-based like the
//! Sheets UI, so `CellRange::cell(4, 3)` renders as `E3`.

use std::fmt;

/// Convert a 0-based column index into its letter form (`0 -> A`, `26 -> AA`).
pub fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (column % 26) as u8) as char);
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// A rectangular block of cells.
///
/// `end_row == None` means the range is open towards the bottom of the sheet
/// (`E4:G`), which is how whole tables are read without knowing their length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_column: u32,
    pub start_row: u32,
    pub end_column: u32,
    pub end_row: Option<u32>,
}

impl CellRange {
    /// A single cell.
    pub fn cell(column: u32, row: u32) -> Self {
        Self {
            start_column: column,
            start_row: row,
            end_column: column,
            end_row: Some(row),
        }
    }

    /// One row spanning `width` columns starting at `column`.
    pub fn row(column: u32, width: u32, row: u32) -> Self {
        Self::rows(column, width, row, row)
    }

    /// Rows `first..=last` spanning `width` columns.
    pub fn rows(column: u32, width: u32, first: u32, last: u32) -> Self {
        Self {
            start_column: column,
            start_row: first,
            end_column: column + width.max(1) - 1,
            end_row: Some(last),
        }
    }

    /// Everything from `row` down to the end of the sheet.
    pub fn open(column: u32, width: u32, row: u32) -> Self {
        Self {
            start_column: column,
            start_row: row,
            end_column: column + width.max(1) - 1,
            end_row: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.end_column - self.start_column + 1
    }

    /// Number of rows, `None` for open ranges.
    pub fn height(&self) -> Option<u32> {
        self.end_row.map(|end| end + 1 - self.start_row)
    }

    pub fn is_single_cell(&self) -> bool {
        self.width() == 1 && self.height() == Some(1)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.start_column), self.start_row)?;
        if self.is_single_cell() {
            return Ok(());
        }
        write!(f, ":{}", column_letters(self.end_column))?;
        if let Some(end_row) = self.end_row {
            write!(f, "{}", end_row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(4), "E");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_range_display() {
        assert_eq!(CellRange::cell(1, 4).to_string(), "B4");
        assert_eq!(CellRange::row(4, 3, 7).to_string(), "E7:G7");
        assert_eq!(CellRange::rows(0, 5, 3, 10).to_string(), "A3:E10");
        assert_eq!(CellRange::open(4, 3, 4).to_string(), "E4:G");
        assert_eq!(CellRange::open(1, 1, 4).to_string(), "B4:B");
        assert_eq!(CellRange::rows(2, 1, 4, 6).to_string(), "C4:C6");
    }

    #[test]
    fn test_range_dimensions() {
        let range = CellRange::rows(4, 3, 4, 9);
        assert_eq!(range.width(), 3);
        assert_eq!(range.height(), Some(6));
        assert_eq!(CellRange::open(4, 3, 4).height(), None);
    }
}
