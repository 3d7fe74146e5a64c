use std::{fmt, str::FromStr};

/// Which half of the workbook an entry or a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Expense,
    Income,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Expense => "expense",
            EntryKind::Income => "income",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" => Ok(EntryKind::Expense),
            "income" | "incomes" => Ok(EntryKind::Income),
            other => Err(format!("kind must be expense or income, not {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("Expense".parse::<EntryKind>(), Ok(EntryKind::Expense));
        assert_eq!(" incomes ".parse::<EntryKind>(), Ok(EntryKind::Income));
        assert!("savings".parse::<EntryKind>().is_err());
        assert_eq!(EntryKind::Income.to_string(), "income");
    }
}
