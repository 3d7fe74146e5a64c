//! The account block of the settings worksheet: name, balance and savings
//! flag in columns E:G.

use std::sync::Arc;

use crate::{
    categories::valid_name,
    error::GridError,
    grid::{BorderStyle, CellValue, GridBackend},
    table::{BoxFrame, TableRegion},
};

pub const NAME_COLUMN: u32 = 4;
pub const FIRST_ROW: u32 = 4;
const WIDTH: u32 = 3;
const BALANCE: u32 = 1;
const SAVINGS: u32 = 2;

const FRAME: BoxFrame = BoxFrame {
    first_column: NAME_COLUMN,
    width: WIDTH,
    first_row: FIRST_ROW,
    outer: BorderStyle::SolidMedium,
    inner: BorderStyle::Dotted,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub name: String,
    pub balance: f64,
    pub is_savings: bool,
}

impl Account {
    fn from_row(row: &[CellValue]) -> Result<Self, GridError> {
        let name = row[0].formatted();
        let balance = row[BALANCE as usize].as_amount().ok_or_else(|| {
            GridError::Invalid(format!(
                "balance of {} is not a number: {}",
                name,
                row[BALANCE as usize].formatted()
            ))
        })?;
        Ok(Self {
            name,
            balance,
            is_savings: row[SAVINGS as usize].as_flag(),
        })
    }

    fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::from(self.name.as_str()),
            CellValue::Number(self.balance),
            CellValue::Bool(self.is_savings),
        ]
    }
}

pub struct AccountsSheet {
    grid: Arc<dyn GridBackend>,
    table: TableRegion,
    accounts: Vec<Account>,
}

impl AccountsSheet {
    pub async fn load(grid: Arc<dyn GridBackend>) -> Result<Self, GridError> {
        let table = TableRegion::load(grid.as_ref(), NAME_COLUMN, WIDTH, FIRST_ROW).await?;
        let accounts = table
            .rows()
            .iter()
            .map(|row| Account::from_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            grid,
            table,
            accounts,
        })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn names(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Account> {
        self.table.find(name).map(|index| &self.accounts[index])
    }

    fn index_of(&self, name: &str) -> Result<usize, GridError> {
        self.table
            .find(name)
            .ok_or_else(|| GridError::NotFound(format!("Account {}", name.trim())))
    }

    pub async fn add(
        &mut self,
        name: &str,
        balance: f64,
        is_savings: bool,
    ) -> Result<Account, GridError> {
        let name = valid_name(name)?;
        if self.table.find(&name).is_some() {
            return Err(GridError::AlreadyExists(format!("Account {}", name)));
        }
        check_amount(balance)?;
        let account = Account {
            name,
            balance,
            is_savings,
        };
        let before = self.table.len();
        self.table.push(self.grid.as_ref(), account.to_row()).await?;
        FRAME.resize(self.grid.as_ref(), before, self.table.len()).await?;
        log::info!(
            "Added account {} balance={} savings={}",
            account.name,
            account.balance,
            account.is_savings
        );
        self.accounts.push(account.clone());
        Ok(account)
    }

    pub async fn rename(&mut self, old_name: &str, new_name: &str) -> Result<Account, GridError> {
        let new_name = valid_name(new_name)?;
        let index = self.index_of(old_name)?;
        if self.table.find(&new_name).is_some_and(|other| other != index) {
            return Err(GridError::AlreadyExists(format!("Account {}", new_name)));
        }
        self.table
            .set_cell(self.grid.as_ref(), index, 0, CellValue::from(new_name.as_str()))
            .await?;
        log::info!("Renamed account {} to {}", self.accounts[index].name, new_name);
        self.accounts[index].name = new_name;
        Ok(self.accounts[index].clone())
    }

    /// Overwrite the balance. Returns the updated account.
    pub async fn set_balance(&mut self, name: &str, balance: f64) -> Result<Account, GridError> {
        check_amount(balance)?;
        let index = self.index_of(name)?;
        self.table
            .set_cell(self.grid.as_ref(), index, BALANCE, CellValue::Number(balance))
            .await?;
        self.accounts[index].balance = balance;
        log::info!("Balance of {} set to {}", self.accounts[index].name, balance);
        Ok(self.accounts[index].clone())
    }

    pub async fn increase_balance(&mut self, name: &str, amount: f64) -> Result<Account, GridError> {
        let current = self.get(name).map(|a| a.balance);
        let current = current.ok_or_else(|| GridError::NotFound(format!("Account {}", name.trim())))?;
        self.set_balance(name, current + amount).await
    }

    pub async fn decrease_balance(&mut self, name: &str, amount: f64) -> Result<Account, GridError> {
        let current = self.get(name).map(|a| a.balance);
        let current = current.ok_or_else(|| GridError::NotFound(format!("Account {}", name.trim())))?;
        self.set_balance(name, current - amount).await
    }

    pub async fn set_savings(&mut self, name: &str, is_savings: bool) -> Result<Account, GridError> {
        let index = self.index_of(name)?;
        self.table
            .set_cell(self.grid.as_ref(), index, SAVINGS, CellValue::Bool(is_savings))
            .await?;
        self.accounts[index].is_savings = is_savings;
        Ok(self.accounts[index].clone())
    }

    pub async fn delete(&mut self, name: &str) -> Result<Account, GridError> {
        let index = self.index_of(name)?;
        let before = self.table.len();
        self.table.remove(self.grid.as_ref(), index).await?;
        FRAME.resize(self.grid.as_ref(), before, self.table.len()).await?;
        let account = self.accounts.remove(index);
        log::info!("Deleted account {}", account.name);
        Ok(account)
    }
}

pub(crate) fn check_amount(amount: f64) -> Result<(), GridError> {
    if !amount.is_finite() {
        return Err(GridError::Invalid(format!("{} is not a finite amount", amount)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{GridOperation, MemoryGrid, Side};

    async fn sheet(rows: &[(&str, CellValue, CellValue)]) -> (Arc<MemoryGrid>, AccountsSheet) {
        let grid = Arc::new(MemoryGrid::new());
        for (i, (name, balance, savings)) in rows.iter().enumerate() {
            let row = FIRST_ROW + i as u32;
            grid.set(NAME_COLUMN, row, *name);
            grid.set(NAME_COLUMN + 1, row, balance.clone());
            grid.set(NAME_COLUMN + 2, row, savings.clone());
        }
        let accounts = AccountsSheet::load(grid.clone()).await.unwrap();
        grid.clear_operations();
        (grid, accounts)
    }

    #[tokio::test]
    async fn test_load_parses_formatted_cells() {
        let (_, accounts) = sheet(&[
            ("Cash", CellValue::from("1,250.50 ₽"), CellValue::from("FALSE")),
            ("Deposit", CellValue::Number(10000.0), CellValue::from("true")),
            ("Card", CellValue::Empty, CellValue::Empty),
        ])
        .await;
        assert_eq!(
            accounts.accounts(),
            &[
                Account {
                    name: "Cash".to_string(),
                    balance: 1250.5,
                    is_savings: false
                },
                Account {
                    name: "Deposit".to_string(),
                    balance: 10000.0,
                    is_savings: true
                },
                Account {
                    name: "Card".to_string(),
                    balance: 0.0,
                    is_savings: false
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_space_grouped_balance_survives_update() {
        let (grid, mut accounts) = sheet(&[
            ("Cash", CellValue::from("1\u{a0}250.50"), CellValue::Empty),
            ("Card", CellValue::from("1 250,50 ₽"), CellValue::Empty),
        ])
        .await;
        accounts.increase_balance("Cash", 10.0).await.unwrap();
        accounts.decrease_balance("card", 50.5).await.unwrap();
        assert_eq!(grid.cell(NAME_COLUMN + 1, 4), Some(CellValue::Number(1260.5)));
        assert_eq!(grid.cell(NAME_COLUMN + 1, 5), Some(CellValue::Number(1200.0)));
    }

    #[tokio::test]
    async fn test_load_rejects_ambiguous_balance() {
        let grid = Arc::new(MemoryGrid::new());
        grid.set(NAME_COLUMN, FIRST_ROW, "Cash");
        grid.set(NAME_COLUMN + 1, FIRST_ROW, "1,250");
        let err = AccountsSheet::load(grid).await.err().unwrap();
        assert!(matches!(err, GridError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_garbage_balance() {
        let grid = Arc::new(MemoryGrid::new());
        grid.set(NAME_COLUMN, FIRST_ROW, "Cash");
        grid.set(NAME_COLUMN + 1, FIRST_ROW, "lots");
        let err = AccountsSheet::load(grid).await.err().unwrap();
        assert!(matches!(err, GridError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_add_writes_row_and_box() {
        let (grid, mut accounts) = sheet(&[]).await;
        let account = accounts.add("cash", 100.0, false).await.unwrap();
        assert_eq!(account.name, "Cash");
        assert_eq!(grid.cell(NAME_COLUMN + 1, 4), Some(CellValue::Number(100.0)));
        assert_eq!(grid.text(NAME_COLUMN + 2, 4), "FALSE");
        assert_eq!(
            grid.operations(),
            vec![
                GridOperation::Write(crate::a1::CellRange::row(NAME_COLUMN, WIDTH, 4)),
                GridOperation::Borders(crate::a1::CellRange::row(NAME_COLUMN, WIDTH, 4)),
                GridOperation::Borders(crate::a1::CellRange::row(NAME_COLUMN, WIDTH, 5)),
            ]
        );
        assert_eq!(grid.border(NAME_COLUMN + 1, 4, Side::Left), BorderStyle::Dotted);
        assert_eq!(grid.border(NAME_COLUMN + 2, 5, Side::Right), BorderStyle::SolidMedium);
        assert_eq!(grid.border(NAME_COLUMN, 5, Side::Bottom), BorderStyle::SolidMedium);
    }

    #[tokio::test]
    async fn test_add_duplicate() {
        let (_, mut accounts) = sheet(&[("Cash", 1.0.into(), false.into())]).await;
        let err = accounts.add("CASH", 5.0, true).await.unwrap_err();
        assert_eq!(err.to_string(), "Account Cash already exists");
    }

    #[tokio::test]
    async fn test_balance_changes() {
        let (grid, mut accounts) = sheet(&[
            ("Cash", 100.0.into(), false.into()),
            ("Card", 50.0.into(), false.into()),
        ])
        .await;

        let card = accounts.decrease_balance("card", 20.5).await.unwrap();
        assert_eq!(card.balance, 29.5);
        assert_eq!(grid.cell(NAME_COLUMN + 1, 5), Some(CellValue::Number(29.5)));

        let cash = accounts.increase_balance("Cash", 0.5).await.unwrap();
        assert_eq!(cash.balance, 100.5);

        let cash = accounts.set_balance("cash", -3.0).await.unwrap();
        assert_eq!(cash.balance, -3.0);
        assert_eq!(accounts.get("CASH").unwrap().balance, -3.0);

        let err = accounts.increase_balance("Bank", 1.0).await.unwrap_err();
        assert!(matches!(err, GridError::NotFound(_)));
        let err = accounts.set_balance("Cash", f64::NAN).await.unwrap_err();
        assert!(matches!(err, GridError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_rename_and_savings() {
        let (grid, mut accounts) = sheet(&[
            ("Cash", 100.0.into(), false.into()),
            ("Card", 50.0.into(), false.into()),
        ])
        .await;
        accounts.rename("card", "debit card").await.unwrap();
        assert_eq!(grid.text(NAME_COLUMN, 5), "Debit Card");
        assert!(accounts.get("Card").is_none());

        let err = accounts.rename("Cash", "debit CARD").await.unwrap_err();
        assert!(matches!(err, GridError::AlreadyExists(_)));

        let cash = accounts.set_savings("cash", true).await.unwrap();
        assert!(cash.is_savings);
        assert_eq!(grid.text(NAME_COLUMN + 2, 4), "TRUE");
    }

    #[tokio::test]
    async fn test_delete_compacts_rows() {
        let (grid, mut accounts) = sheet(&[
            ("Cash", 100.0.into(), false.into()),
            ("Card", 50.0.into(), false.into()),
            ("Bank", 7.0.into(), true.into()),
        ])
        .await;
        let removed = accounts.delete("cash").await.unwrap();
        assert_eq!(removed.name, "Cash");
        assert_eq!(accounts.names(), vec!["Card", "Bank"]);
        assert_eq!(grid.text(NAME_COLUMN, 4), "Card");
        assert_eq!(grid.text(NAME_COLUMN + 2, 5), "TRUE");
        assert_eq!(grid.text(NAME_COLUMN, 6), "");
        assert_eq!(grid.border(NAME_COLUMN, 6, Side::Bottom), BorderStyle::SolidMedium);
    }
}
