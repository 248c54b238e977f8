//! Checks shared by the request forms of several resources.

use crate::Error;

/// Trim `value` and check that something is left.
///
/// # Errors
/// Returns [Error::EmptyField] naming `field` if `value` is empty or whitespace.
pub fn required_text(value: &str, field: &'static str) -> Result<String, Error> {
    let value = value.trim();

    if value.is_empty() {
        Err(Error::EmptyField(field))
    } else {
        Ok(value.to_owned())
    }
}

/// Trim `value`, treating empty or whitespace text as missing.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Check that an amount is a finite number greater than zero.
///
/// # Errors
/// Returns [Error::NonPositiveAmount] naming `field` otherwise.
pub fn positive_amount(amount: f64, field: &'static str) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::NonPositiveAmount(field))
    }
}

/// Check that an amount is a finite number that is zero or more.
///
/// # Errors
/// Returns [Error::NegativeAmount] naming `field` otherwise.
pub fn non_negative_amount(amount: f64, field: &'static str) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::NegativeAmount(field))
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{non_negative_amount, optional_text, positive_amount, required_text};

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(required_text("  Bank ", "name"), Ok("Bank".to_owned()));
    }

    #[test]
    fn required_text_rejects_whitespace() {
        assert_eq!(required_text(" \t", "name"), Err(Error::EmptyField("name")));
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(optional_text(Some("   ".to_owned())), None);
        assert_eq!(optional_text(Some(" note ".to_owned())), Some("note".to_owned()));
    }

    #[test]
    fn zero_is_not_positive() {
        assert_eq!(positive_amount(0.0, "amount"), Err(Error::NonPositiveAmount("amount")));
        assert_eq!(
            positive_amount(f64::NAN, "amount"),
            Err(Error::NonPositiveAmount("amount"))
        );
    }

    #[test]
    fn zero_is_non_negative() {
        assert_eq!(non_negative_amount(0.0, "balance"), Ok(0.0));
        assert_eq!(
            non_negative_amount(-0.01, "balance"),
            Err(Error::NegativeAmount("balance"))
        );
    }
}
