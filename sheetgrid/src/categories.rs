//! Expense and income category lists of the settings worksheet.
//!
//! The two lists live side by side in columns B and C and share one box,
//! so the box height is the length of the longer list.

use std::sync::Arc;

use crate::{
    error::GridError,
    grid::{BorderStyle, CellValue, GridBackend},
    kind::EntryKind,
    names::title_case,
    table::{BoxFrame, TableRegion},
};

pub const EXPENSE_COLUMN: u32 = 1;
pub const INCOME_COLUMN: u32 = 2;
pub const FIRST_ROW: u32 = 4;

const FRAME: BoxFrame = BoxFrame {
    first_column: EXPENSE_COLUMN,
    width: 2,
    first_row: FIRST_ROW,
    outer: BorderStyle::SolidMedium,
    inner: BorderStyle::Dashed,
};

fn column(kind: EntryKind) -> u32 {
    match kind {
        EntryKind::Expense => EXPENSE_COLUMN,
        EntryKind::Income => INCOME_COLUMN,
    }
}

fn label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Expense => "Expense category",
        EntryKind::Income => "Income category",
    }
}

pub struct CategoriesSheet {
    grid: Arc<dyn GridBackend>,
    expense: TableRegion,
    income: TableRegion,
}

impl CategoriesSheet {
    pub async fn load(grid: Arc<dyn GridBackend>) -> Result<Self, GridError> {
        let expense = TableRegion::load(grid.as_ref(), EXPENSE_COLUMN, 1, FIRST_ROW).await?;
        let income = TableRegion::load(grid.as_ref(), INCOME_COLUMN, 1, FIRST_ROW).await?;
        Ok(Self {
            grid,
            expense,
            income,
        })
    }

    fn table(&self, kind: EntryKind) -> &TableRegion {
        match kind {
            EntryKind::Expense => &self.expense,
            EntryKind::Income => &self.income,
        }
    }

    fn table_mut(&mut self, kind: EntryKind) -> &mut TableRegion {
        match kind {
            EntryKind::Expense => &mut self.expense,
            EntryKind::Income => &mut self.income,
        }
    }

    /// Rows enclosed by the shared box.
    pub fn height(&self) -> usize {
        self.expense.len().max(self.income.len())
    }

    pub fn names(&self, kind: EntryKind) -> Vec<String> {
        self.table(kind).names()
    }

    /// Stored spelling of a category, looked up case-insensitively.
    pub fn get(&self, kind: EntryKind, name: &str) -> Option<String> {
        let table = self.table(kind);
        table.find(name).map(|index| table.names()[index].clone())
    }

    pub async fn add(&mut self, kind: EntryKind, name: &str) -> Result<String, GridError> {
        let name = valid_name(name)?;
        if self.table(kind).find(&name).is_some() {
            return Err(GridError::AlreadyExists(format!("{} {}", label(kind), name)));
        }
        let before = self.height();
        let grid = self.grid.clone();
        self.table_mut(kind)
            .push(grid.as_ref(), vec![CellValue::from(name.as_str())])
            .await?;
        FRAME.resize(grid.as_ref(), before, self.height()).await?;
        log::info!("Added {} {} (column {})", kind, name, column(kind));
        Ok(name)
    }

    pub async fn rename(
        &mut self,
        kind: EntryKind,
        old_name: &str,
        new_name: &str,
    ) -> Result<String, GridError> {
        let new_name = valid_name(new_name)?;
        let table = self.table(kind);
        let index = table
            .find(old_name)
            .ok_or_else(|| GridError::NotFound(format!("{} {}", label(kind), old_name.trim())))?;
        if table.find(&new_name).is_some_and(|other| other != index) {
            return Err(GridError::AlreadyExists(format!(
                "{} {}",
                label(kind),
                new_name
            )));
        }
        let grid = self.grid.clone();
        self.table_mut(kind)
            .set_cell(grid.as_ref(), index, 0, CellValue::from(new_name.as_str()))
            .await?;
        log::info!("Renamed {} {} to {}", kind, old_name.trim(), new_name);
        Ok(new_name)
    }

    pub async fn delete(&mut self, kind: EntryKind, name: &str) -> Result<String, GridError> {
        let index = self
            .table(kind)
            .find(name)
            .ok_or_else(|| GridError::NotFound(format!("{} {}", label(kind), name.trim())))?;
        let before = self.height();
        let grid = self.grid.clone();
        let removed = self.table_mut(kind).remove(grid.as_ref(), index).await?;
        FRAME.resize(grid.as_ref(), before, self.height()).await?;
        let removed = removed[0].formatted();
        log::info!("Deleted {} {}", kind, removed);
        Ok(removed)
    }
}

pub(crate) fn valid_name(name: &str) -> Result<String, GridError> {
    let name = title_case(name);
    if name.is_empty() {
        return Err(GridError::Invalid("name must not be empty".to_string()));
    }
    Ok(name)
}
