//! The journal worksheet: expenses in A:E and incomes in G:K, newest first.

use std::sync::{Arc, OnceLock};

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

use crate::{
    error::GridError,
    grid::{CellValue, GridBackend},
    kind::EntryKind,
    table::TableRegion,
};

pub const FIRST_ROW: u32 = 3;
const WIDTH: u32 = 5;

fn first_column(kind: EntryKind) -> u32 {
    match kind {
        EntryKind::Expense => 0,
        EntryKind::Income => 6,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub account: String,
    pub comment: String,
}

impl Entry {
    fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::Formula(date_formula(self.date)),
            CellValue::from(self.category.as_str()),
            CellValue::Number(self.amount),
            CellValue::from(self.account.as_str()),
            CellValue::from(self.comment.as_str()),
        ]
    }

    fn from_row(row: &[CellValue]) -> Result<Self, GridError> {
        let date = parse_date(&row[0])
            .ok_or_else(|| GridError::Invalid(format!("not a date: {}", row[0].formatted())))?;
        let amount = row[2]
            .as_amount()
            .ok_or_else(|| GridError::Invalid(format!("not an amount: {}", row[2].formatted())))?;
        Ok(Self {
            date,
            category: row[1].formatted(),
            amount,
            account: row[3].formatted(),
            comment: row[4].formatted(),
        })
    }
}

/// `=DATE(y, m, d)`, entered as a formula so the sheet formats it as a date.
pub fn date_formula(date: NaiveDate) -> String {
    format!("=DATE({}, {}, {})", date.year(), date.month(), date.day())
}

/// Read a date cell: a serial day number as returned for unformatted
/// values, a `=DATE(...)` formula, or ISO / day-first text.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    static DATE_FORMULA: OnceLock<Regex> = OnceLock::new();
    match value {
        CellValue::Number(serial) if *serial >= 0.0 => {
            let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
            epoch.checked_add_days(Days::new(serial.trunc() as u64))
        }
        CellValue::Formula(formula) => {
            let pattern = DATE_FORMULA.get_or_init(|| {
                Regex::new(r"(?i)^=DATE\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$")
                    .expect("valid date formula regex")
            });
            let captures = pattern.captures(formula.trim())?;
            NaiveDate::from_ymd_opt(
                captures[1].parse().ok()?,
                captures[2].parse().ok()?,
                captures[3].parse().ok()?,
            )
        }
        CellValue::Text(text) => {
            let text = text.trim();
            ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"]
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        }
        _ => None,
    }
}

pub struct Journal {
    grid: Arc<dyn GridBackend>,
}

impl Journal {
    pub fn new(grid: Arc<dyn GridBackend>) -> Self {
        Self { grid }
    }

    async fn table(&self, kind: EntryKind) -> Result<TableRegion, GridError> {
        TableRegion::load(self.grid.as_ref(), first_column(kind), WIDTH, FIRST_ROW).await
    }

    /// Entries of one kind, newest first.
    pub async fn entries(&self, kind: EntryKind) -> Result<Vec<Entry>, GridError> {
        self.table(kind)
            .await?
            .rows()
            .iter()
            .map(|row| Entry::from_row(row))
            .collect()
    }

    /// Put an entry on top of its half of the journal.
    pub async fn prepend(&self, kind: EntryKind, entry: &Entry) -> Result<(), GridError> {
        let mut table = self.table(kind).await?;
        table.prepend(self.grid.as_ref(), entry.to_row()).await?;
        log::info!(
            "Recorded {} {} {} from {} on {}",
            kind,
            entry.category,
            entry.amount,
            entry.account,
            entry.date
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGrid;

    fn entry(day: u32, category: &str, amount: f64) -> Entry {
        Entry {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            category: category.to_string(),
            amount,
            account: "Cash".to_string(),
            comment: String::new(),
        }
    }

    #[test]
    fn test_parse_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date(&CellValue::Number(45360.0)), Some(date));
        let formula = |text: &str| CellValue::Formula(text.to_string());
        assert_eq!(parse_date(&formula("=DATE(2024, 3, 9)")), Some(date));
        assert_eq!(parse_date(&formula("=date(2024,3,9)")), Some(date));
        // literal text is never evaluated
        assert_eq!(parse_date(&CellValue::from("=DATE(2024, 3, 9)")), None);
        assert_eq!(parse_date(&CellValue::from("2024-03-09")), Some(date));
        assert_eq!(parse_date(&CellValue::from("09.03.2024")), Some(date));
        assert_eq!(parse_date(&CellValue::from("yesterday")), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
    }

    #[test]
    fn test_date_formula() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(date_formula(date), "=DATE(2024, 12, 1)");
    }

    #[tokio::test]
    async fn test_prepend_newest_first() {
        let grid = Arc::new(MemoryGrid::new());
        let journal = Journal::new(grid.clone());

        journal
            .prepend(EntryKind::Expense, &entry(1, "Food", 10.0))
            .await
            .unwrap();
        journal
            .prepend(EntryKind::Expense, &entry(2, "Rent", 500.0))
            .await
            .unwrap();
        journal
            .prepend(EntryKind::Income, &entry(3, "Salary", 900.0))
            .await
            .unwrap();

        assert_eq!(grid.text(0, 3), "=DATE(2024, 3, 2)");
        assert_eq!(grid.text(1, 3), "Rent");
        assert_eq!(grid.text(1, 4), "Food");
        assert_eq!(grid.text(7, 3), "Salary");
        assert_eq!(grid.text(7, 4), "");
        // older rows keep their formulas when moved down
        assert_eq!(
            grid.cell(0, 4),
            Some(CellValue::Formula("=DATE(2024, 3, 1)".to_string()))
        );

        let expenses = journal.entries(EntryKind::Expense).await.unwrap();
        assert_eq!(expenses, vec![entry(2, "Rent", 500.0), entry(1, "Food", 10.0)]);
        let incomes = journal.entries(EntryKind::Income).await.unwrap();
        assert_eq!(incomes, vec![entry(3, "Salary", 900.0)]);
    }

    #[tokio::test]
    async fn test_comment_is_kept() {
        let grid = Arc::new(MemoryGrid::new());
        let journal = Journal::new(grid.clone());
        let mut with_comment = entry(5, "Taxi", 12.5);
        with_comment.comment = "airport".to_string();
        journal.prepend(EntryKind::Expense, &with_comment).await.unwrap();
        assert_eq!(grid.text(4, 3), "airport");
        assert_eq!(
            journal.entries(EntryKind::Expense).await.unwrap(),
            vec![with_comment]
        );
    }
}
