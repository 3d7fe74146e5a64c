//! The seam between table logic and the place cells actually live.
//!
//! Everything above this module talks to a worksheet through [`GridBackend`]:
//! the Google implementation in [`crate::google`] and the in-memory one in
//! [`crate::memory`] are interchangeable.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::{a1::CellRange, error::GridError};

/// A value written into a cell.
///
/// `Text` is always stored literally, even when it looks like a number, a
/// date or a formula. Only `Formula` is evaluated by the sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Formula(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Text(text) | CellValue::Formula(text) => Value::String(text.clone()),
            CellValue::Number(number) => serde_json::Number::from_f64(*number)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(number.to_string())),
            CellValue::Bool(flag) => Value::Bool(*flag),
            CellValue::Empty => Value::String(String::new()),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(text) if text.is_empty() => CellValue::Empty,
            Value::String(text) => CellValue::Text(text.clone()),
            Value::Number(number) => number
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(number.to_string())),
            Value::Bool(flag) => CellValue::Bool(*flag),
            Value::Null => CellValue::Empty,
            other => CellValue::Text(other.to_string()),
        }
    }

    /// The text a user would see in the cell.
    pub fn formatted(&self) -> String {
        match self {
            CellValue::Text(text) | CellValue::Formula(text) => text.clone(),
            CellValue::Number(number) => number.to_string(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(text) => text.is_empty(),
            CellValue::Empty => true,
            _ => false,
        }
    }

    /// Read a money amount. Formatted text such as `1,234.50 ₽` or
    /// `1 250,50 ₽` is accepted. Empty cells count as zero, text that
    /// cannot be read unambiguously gives `None`.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) => Some(*number),
            CellValue::Empty => Some(0.0),
            CellValue::Text(text) => parse_amount_text(text),
            CellValue::Formula(_) | CellValue::Bool(_) => None,
        }
    }

    /// Checkbox-style flag: `TRUE` in any case, or a real boolean.
    pub fn as_flag(&self) -> bool {
        match self {
            CellValue::Bool(flag) => *flag,
            CellValue::Text(text) => text.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        CellValue::Text(text)
    }
}

impl From<f64> for CellValue {
    fn from(number: f64) -> Self {
        CellValue::Number(number)
    }
}

impl From<bool> for CellValue {
    fn from(flag: bool) -> Self {
        CellValue::Bool(flag)
    }
}

/// Amount written as text: an optional sign and currency around digits
/// with group and decimal separators.
fn parse_amount_text(text: &str) -> Option<f64> {
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    let amount = AMOUNT.get_or_init(|| {
        Regex::new(r"^([-+\u{2212}]?)[^\d.,\-+]*([-+\u{2212}]?)([\d.,]*\d[\d.,]*)[^\d.,]*$")
            .expect("valid amount regex")
    });

    // Spaces of every kind and apostrophes only ever group digits
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(*c, '\u{202f}' | '\'' | '\u{2019}'))
        .collect();
    let captures = amount.captures(&compact)?;
    let negative = match (&captures[1], &captures[2]) {
        ("", sign) | (sign, "") => matches!(sign, "-" | "\u{2212}"),
        _ => return None,
    };
    let number = normalize_separators(&captures[3])?;
    let value = number.parse::<f64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Turn `1,234.50`, `1.234,50`, `1250,5` and `1,234,567` into plain
/// `1234.50`-style text. A lone separator followed by exactly three digits
/// could be either kind, so it is rejected.
fn normalize_separators(digits: &str) -> Option<String> {
    let last_dot = digits.rfind('.');
    let last_comma = digits.rfind(',');
    let (group, decimal) = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if dot > comma => (Some(','), Some('.')),
        (Some(_), Some(_)) => (Some('.'), Some(',')),
        (Some(_), None) | (None, Some(_)) => {
            let separator = if last_dot.is_some() { '.' } else { ',' };
            let parts: Vec<&str> = digits.split(separator).collect();
            match parts.as_slice() {
                [_, fraction] if fraction.len() == 3 => return None,
                [_, _] => (None, Some(separator)),
                _ => (Some(separator), None),
            }
        }
        (None, None) => (None, None),
    };

    let (integer, fraction) = match decimal {
        Some(decimal) => {
            let (integer, fraction) = digits.rsplit_once(decimal)?;
            if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            (integer, Some(fraction))
        }
        None => (digits, None),
    };

    let integer = match group {
        Some(group) => {
            let mut groups = integer.split(group);
            let head = groups.next()?;
            if head.is_empty() || head.len() > 3 {
                return None;
            }
            let mut joined = head.to_string();
            for tail in groups {
                if tail.len() != 3 {
                    return None;
                }
                joined.push_str(tail);
            }
            joined
        }
        None => integer.to_string(),
    };
    if integer.is_empty() || !integer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(match fraction {
        Some(fraction) => format!("{}.{}", integer, fraction),
        None => integer,
    })
}

/// Line styles understood by the Sheets API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Dotted,
    Dashed,
    Solid,
    SolidMedium,
    SolidThick,
    Double,
}

impl BorderStyle {
    pub fn api_name(&self) -> &'static str {
        match self {
            BorderStyle::None => "NONE",
            BorderStyle::Dotted => "DOTTED",
            BorderStyle::Dashed => "DASHED",
            BorderStyle::Solid => "SOLID",
            BorderStyle::SolidMedium => "SOLID_MEDIUM",
            BorderStyle::SolidThick => "SOLID_THICK",
            BorderStyle::Double => "DOUBLE",
        }
    }
}

/// Border update for a range. `None` fields are left as they are,
/// `Some(BorderStyle::None)` erases that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Borders {
    pub top: Option<BorderStyle>,
    pub bottom: Option<BorderStyle>,
    pub left: Option<BorderStyle>,
    pub right: Option<BorderStyle>,
    pub inner_vertical: Option<BorderStyle>,
    pub inner_horizontal: Option<BorderStyle>,
}

impl Borders {
    /// Erase every side except the top, which belongs to the row above.
    pub fn erased() -> Self {
        Self {
            bottom: Some(BorderStyle::None),
            left: Some(BorderStyle::None),
            right: Some(BorderStyle::None),
            inner_vertical: Some(BorderStyle::None),
            ..Default::default()
        }
    }
}

/// One worksheet.
#[async_trait::async_trait]
pub trait GridBackend: Send + Sync {
    /// Unformatted cell values, row by row. Trailing empty cells and rows
    /// are omitted, so short rows are normal.
    async fn read(&self, range: &CellRange) -> Result<Vec<Vec<CellValue>>, GridError>;

    /// Cell contents as they would have to be written to recreate them:
    /// formulas as [`CellValue::Formula`], everything else as [`read`]
    /// returns it. Used when rows are moved.
    ///
    /// [`read`]: GridBackend::read
    async fn read_formulas(&self, range: &CellRange) -> Result<Vec<Vec<CellValue>>, GridError>;

    /// Write a block of values starting at the range's top-left cell.
    async fn write(&self, range: &CellRange, values: Vec<Vec<CellValue>>) -> Result<(), GridError>;

    /// Update the borders of a closed range.
    async fn set_borders(&self, range: &CellRange, borders: Borders) -> Result<(), GridError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_amount() {
        assert_eq!(CellValue::Number(12.5).as_amount(), Some(12.5));
        assert_eq!(CellValue::from("1,234.50 ₽").as_amount(), Some(1234.5));
        assert_eq!(CellValue::from("$99.90").as_amount(), Some(99.9));
        assert_eq!(CellValue::from("-15").as_amount(), Some(-15.0));
        assert_eq!(CellValue::Empty.as_amount(), Some(0.0));
        assert_eq!(CellValue::from("n/a").as_amount(), None);
        assert_eq!(CellValue::Bool(true).as_amount(), None);
        assert_eq!(CellValue::Formula("=A1".to_string()).as_amount(), None);
    }

    #[test]
    fn test_as_amount_grouped_text() {
        assert_eq!(CellValue::from("1\u{a0}250.50").as_amount(), Some(1250.5));
        assert_eq!(CellValue::from("1 250,50 ₽").as_amount(), Some(1250.5));
        assert_eq!(CellValue::from("1\u{202f}250,50\u{a0}₽").as_amount(), Some(1250.5));
        assert_eq!(CellValue::from("1.234.567,89 €").as_amount(), Some(1234567.89));
        assert_eq!(CellValue::from("1,234,567").as_amount(), Some(1234567.0));
        assert_eq!(CellValue::from("-$1,250.00").as_amount(), Some(-1250.0));
        assert_eq!(CellValue::from("1250,5").as_amount(), Some(1250.5));
    }

    #[test]
    fn test_as_amount_rejects_ambiguous_text() {
        // thousands or decimals, no way to tell
        assert_eq!(CellValue::from("1,250").as_amount(), None);
        assert_eq!(CellValue::from("12 abc 34").as_amount(), None);
        assert_eq!(CellValue::from("1,25,0.5").as_amount(), None);
        assert_eq!(CellValue::from("1.2.3,4.5").as_amount(), None);
        assert_eq!(CellValue::from("₽").as_amount(), None);
    }

    #[test]
    fn test_as_flag() {
        assert!(CellValue::Bool(true).as_flag());
        assert!(CellValue::from("TRUE").as_flag());
        assert!(CellValue::from("true").as_flag());
        assert!(!CellValue::from("FALSE").as_flag());
        assert!(!CellValue::Empty.as_flag());
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(CellValue::from_json(&Value::String(String::new())), CellValue::Empty);
        assert_eq!(CellValue::from_json(&serde_json::json!(7.5)), CellValue::Number(7.5));
        assert_eq!(CellValue::from_json(&Value::Bool(false)), CellValue::Bool(false));
        assert_eq!(CellValue::Number(3.0).to_json(), serde_json::json!(3.0));
        assert_eq!(CellValue::Empty.to_json(), Value::String(String::new()));
    }
}
