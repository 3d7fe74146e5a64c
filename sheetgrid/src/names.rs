//! Entity names as they are stored in the sheet.

/// Title-case a name: the first letter after a non-letter is uppercased and
/// every other letter lowercased (`"credit CARD"` -> `"Credit Card"`).
pub fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut previous_is_letter = false;
    for c in name.trim().chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }
    result
}

/// Case-insensitive name comparison.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("food"), "Food");
        assert_eq!(title_case("credit CARD"), "Credit Card");
        assert_eq!(title_case("  savings  "), "Savings");
        assert_eq!(title_case("e-wallet"), "E-Wallet");
        assert_eq!(title_case("2nd card"), "2Nd Card");
        assert_eq!(title_case("продукты и КАФЕ"), "Продукты И Кафе");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_same_name() {
        assert!(same_name("Cash", "cash"));
        assert!(same_name("Наличные", "НАЛИЧНЫЕ "));
        assert!(!same_name("Cash", "Card"));
    }
}
