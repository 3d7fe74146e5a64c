//! Spreadsheet-backed bookkeeping: categories, accounts and a journal kept
//! as plain row ranges of a Google Sheet.

pub mod a1;
pub mod accounts;
pub mod categories;
pub mod error;
pub mod google;
pub mod grid;
pub mod journal;
pub mod kind;
pub mod memory;
pub mod names;
pub mod table;
pub mod workbook;

pub use accounts::{Account, AccountsSheet};
pub use categories::CategoriesSheet;
pub use error::GridError;
pub use google::GoogleSheets;
pub use grid::{BorderStyle, Borders, CellValue, GridBackend};
pub use journal::{Entry, Journal};
pub use kind::EntryKind;
pub use memory::MemoryGrid;
pub use workbook::{MemoryBook, MemoryWorkbooks, NewEntry, Workbook, WorkbookProvider};
