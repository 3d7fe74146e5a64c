/// Parse a money amount typed by the user.
///
/// A comma works as the decimal point (`12,5`), spaces are ignored
/// (`1 200`), and at most one decimal point is allowed. The amount must not
/// be negative.
pub fn parse_amount(text: &str) -> Result<f64, String> {
    let amount = parse_signed(text)?;
    if amount < 0.0 {
        return Err("The amount can't be negative".to_string());
    }
    Ok(amount)
}

/// Same as [`parse_amount`] but negative values are allowed, for balances
/// of credit accounts.
pub fn parse_balance(text: &str) -> Result<f64, String> {
    parse_signed(text)
}

fn parse_signed(text: &str) -> Result<f64, String> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if normalized.matches('.').count() > 1 {
        return Err("Use only one decimal point, for example 1250.50".to_string());
    }
    // f64 parsing would also accept "inf" and "NaN"
    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
    {
        return Err("Please enter a number, for example 250 or 12,50".to_string());
    }
    match normalized.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err("Please enter a number, for example 250 or 12,50".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_decimal_amounts() {
        assert_eq!(parse_amount("250"), Ok(250.0));
        assert_eq!(parse_amount(" 12.5 "), Ok(12.5));
        assert_eq!(parse_amount("12,5"), Ok(12.5));
        assert_eq!(parse_amount("1 200,75"), Ok(1200.75));
        assert_eq!(parse_amount("0"), Ok(0.0));
    }

    #[test]
    fn test_rejected_amounts() {
        assert!(parse_amount("1.200,50").unwrap_err().contains("one decimal point"));
        assert!(parse_amount("1,2,3").is_err());
        assert!(parse_amount("ten").unwrap_err().contains("enter a number"));
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("-5").unwrap_err().contains("negative"));
    }

    #[test]
    fn test_balance_may_be_negative() {
        assert_eq!(parse_balance("-350,5"), Ok(-350.5));
        assert_eq!(parse_balance("+10"), Ok(10.0));
        assert!(parse_balance("--1").is_err());
    }
}
