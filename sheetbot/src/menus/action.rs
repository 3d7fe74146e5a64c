use std::{fmt, str::FromStr};

use sheetgrid::EntryKind;

/// Inline button presses, encoded as callback data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenAccounts,
    OpenCategories,
    CloseSettings,
    ChangeBalance,
    AddAccount,
    RenameAccount,
    DeleteAccount,
    ListAccounts,
    CategoryKind(EntryKind),
    AddCategory(EntryKind),
    RenameCategory(EntryKind),
    DeleteCategory(EntryKind),
    ListCategories(EntryKind),
    SkipComment,
    Yes,
    No,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuAction::OpenAccounts => write!(f, "accounts"),
            MenuAction::OpenCategories => write!(f, "categories"),
            MenuAction::CloseSettings => write!(f, "close"),
            MenuAction::ChangeBalance => write!(f, "account_balance"),
            MenuAction::AddAccount => write!(f, "account_add"),
            MenuAction::RenameAccount => write!(f, "account_rename"),
            MenuAction::DeleteAccount => write!(f, "account_delete"),
            MenuAction::ListAccounts => write!(f, "account_list"),
            MenuAction::CategoryKind(kind) => write!(f, "categories:{}", kind),
            MenuAction::AddCategory(kind) => write!(f, "category_add:{}", kind),
            MenuAction::RenameCategory(kind) => write!(f, "category_rename:{}", kind),
            MenuAction::DeleteCategory(kind) => write!(f, "category_delete:{}", kind),
            MenuAction::ListCategories(kind) => write!(f, "category_list:{}", kind),
            MenuAction::SkipComment => write!(f, "skip"),
            MenuAction::Yes => write!(f, "yes"),
            MenuAction::No => write!(f, "no"),
        }
    }
}

impl FromStr for MenuAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((action, kind)) = s.split_once(':') {
            let kind = kind.parse::<EntryKind>()?;
            return match action {
                "categories" => Ok(MenuAction::CategoryKind(kind)),
                "category_add" => Ok(MenuAction::AddCategory(kind)),
                "category_rename" => Ok(MenuAction::RenameCategory(kind)),
                "category_delete" => Ok(MenuAction::DeleteCategory(kind)),
                "category_list" => Ok(MenuAction::ListCategories(kind)),
                _ => Err(format!("Unknown menu action: {}", s)),
            };
        }
        match s {
            "accounts" => Ok(MenuAction::OpenAccounts),
            "categories" => Ok(MenuAction::OpenCategories),
            "close" => Ok(MenuAction::CloseSettings),
            "account_balance" => Ok(MenuAction::ChangeBalance),
            "account_add" => Ok(MenuAction::AddAccount),
            "account_rename" => Ok(MenuAction::RenameAccount),
            "account_delete" => Ok(MenuAction::DeleteAccount),
            "account_list" => Ok(MenuAction::ListAccounts),
            "skip" => Ok(MenuAction::SkipComment),
            "yes" => Ok(MenuAction::Yes),
            "no" => Ok(MenuAction::No),
            _ => Err(format!("Unknown menu action: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_data_parses_back() {
        let actions = [
            MenuAction::OpenAccounts,
            MenuAction::OpenCategories,
            MenuAction::DeleteAccount,
            MenuAction::CategoryKind(EntryKind::Income),
            MenuAction::RenameCategory(EntryKind::Expense),
            MenuAction::SkipComment,
            MenuAction::No,
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<MenuAction>(), Ok(action));
        }
    }

    #[test]
    fn test_unknown_callback_data() {
        assert!("finish_expense".parse::<MenuAction>().is_err());
        assert!("category_add:savings".parse::<MenuAction>().is_err());
        assert!("unknown:expense".parse::<MenuAction>().is_err());
    }

    #[test]
    fn test_callback_data_fits_telegram_limit() {
        let longest = MenuAction::RenameCategory(EntryKind::Expense).to_string();
        assert!(longest.len() <= 64);
    }
}
