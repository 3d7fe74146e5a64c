//! A user's spreadsheet as a whole, and the providers that open one.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;

use crate::{
    accounts::{Account, AccountsSheet, check_amount},
    categories::CategoriesSheet,
    error::GridError,
    grid::GridBackend,
    journal::{Entry, Journal},
    kind::EntryKind,
    memory::MemoryGrid,
};

/// What the user typed for a new expense or income.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub category: String,
    pub amount: f64,
    pub account: String,
    pub comment: Option<String>,
}

/// The journal worksheet and the settings worksheet of one spreadsheet.
#[derive(Clone)]
pub struct Workbook {
    journal: Arc<dyn GridBackend>,
    settings: Arc<dyn GridBackend>,
}

impl Workbook {
    pub fn new(journal: Arc<dyn GridBackend>, settings: Arc<dyn GridBackend>) -> Self {
        Self { journal, settings }
    }

    pub async fn categories(&self) -> Result<CategoriesSheet, GridError> {
        CategoriesSheet::load(self.settings.clone()).await
    }

    pub async fn accounts(&self) -> Result<AccountsSheet, GridError> {
        AccountsSheet::load(self.settings.clone()).await
    }

    pub fn journal(&self) -> Journal {
        Journal::new(self.journal.clone())
    }

    /// Record an entry dated today.
    pub async fn record(&self, kind: EntryKind, draft: NewEntry) -> Result<Entry, GridError> {
        self.record_on(kind, draft, Local::now().date_naive()).await
    }

    /// Journal the entry, then move the account balance: expenses take
    /// from it, incomes add to it.
    pub async fn record_on(
        &self,
        kind: EntryKind,
        draft: NewEntry,
        date: NaiveDate,
    ) -> Result<Entry, GridError> {
        let categories = self.categories().await?;
        let category = categories.get(kind, &draft.category).ok_or_else(|| {
            GridError::NotFound(format!("Category {}", draft.category.trim()))
        })?;
        let mut accounts = self.accounts().await?;
        let account = accounts
            .get(&draft.account)
            .map(|a| a.name.clone())
            .ok_or_else(|| GridError::NotFound(format!("Account {}", draft.account.trim())))?;
        check_amount(draft.amount)?;
        if draft.amount < 0.0 {
            return Err(GridError::Invalid("amount must not be negative".to_string()));
        }

        let entry = Entry {
            date,
            category,
            amount: draft.amount,
            account,
            comment: draft.comment.unwrap_or_default().trim().to_string(),
        };
        self.journal().prepend(kind, &entry).await?;
        match kind {
            EntryKind::Expense => accounts.decrease_balance(&entry.account, entry.amount).await?,
            EntryKind::Income => accounts.increase_balance(&entry.account, entry.amount).await?,
        };
        Ok(entry)
    }

    /// Move money between two accounts. Returns the source and target after
    /// the move.
    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<(Account, Account), GridError> {
        check_amount(amount)?;
        if amount <= 0.0 {
            return Err(GridError::Invalid("amount must be positive".to_string()));
        }
        let mut accounts = self.accounts().await?;
        let source = accounts
            .get(from)
            .map(|a| a.name.clone())
            .ok_or_else(|| GridError::NotFound(format!("Account {}", from.trim())))?;
        let target = accounts
            .get(to)
            .map(|a| a.name.clone())
            .ok_or_else(|| GridError::NotFound(format!("Account {}", to.trim())))?;
        if source == target {
            return Err(GridError::Invalid(
                "source and target accounts must differ".to_string(),
            ));
        }
        let source = accounts.decrease_balance(&source, amount).await?;
        let target = accounts.increase_balance(&target, amount).await?;
        log::info!("Transferred {} from {} to {}", amount, source.name, target.name);
        Ok((source, target))
    }
}

/// Opens spreadsheets by id.
#[async_trait]
pub trait WorkbookProvider: Send + Sync {
    async fn open(&self, spreadsheet_id: &str) -> Result<Workbook, GridError>;

    /// Whether the spreadsheet exists and can be edited by the bot.
    async fn check_access(&self, spreadsheet_id: &str) -> bool;
}

/// Worksheets of an in-memory spreadsheet.
#[derive(Clone, Default)]
pub struct MemoryBook {
    pub journal: Arc<MemoryGrid>,
    pub settings: Arc<MemoryGrid>,
}

impl MemoryBook {
    pub fn workbook(&self) -> Workbook {
        Workbook::new(self.journal.clone(), self.settings.clone())
    }
}

/// Spreadsheets kept in memory, created on first access.
#[derive(Default)]
pub struct MemoryWorkbooks {
    books: Mutex<HashMap<String, MemoryBook>>,
}

impl MemoryWorkbooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The spreadsheet with this id, created empty if it is new.
    pub async fn book(&self, spreadsheet_id: &str) -> MemoryBook {
        self.books
            .lock()
            .await
            .entry(spreadsheet_id.to_string())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl WorkbookProvider for MemoryWorkbooks {
    async fn open(&self, spreadsheet_id: &str) -> Result<Workbook, GridError> {
        Ok(self.book(spreadsheet_id).await.workbook())
    }

    async fn check_access(&self, spreadsheet_id: &str) -> bool {
        !spreadsheet_id.trim().is_empty()
    }
}
