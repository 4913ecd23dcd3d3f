//! Parsing and formatting of expense amounts.
//!
//! Amounts are plain `f64` values. Balances accumulate shares such as
//! `10 / 3`, so every comparison against zero goes through [`EPSILON`].

use crate::{EngineError, ResultEngine};

/// Tolerance used when deciding whether a balance is settled.
pub const EPSILON: f64 = 0.001;

/// Returns `true` when `value` is zero within [`EPSILON`].
#[must_use]
pub fn is_settled(value: f64) -> bool {
    value.abs() <= EPSILON
}

/// Formats an amount with two decimals and the euro sign.
///
/// # Examples
///
/// ```rust
/// use engine::format_amount;
///
/// assert_eq!(format_amount(12.5), "12.50€");
/// assert_eq!(format_amount(-0.0004), "0.00€");
/// ```
#[must_use]
pub fn format_amount(value: f64) -> String {
    let value = if is_settled(value) { 0.0 } else { value };
    format!("{value:.2}€")
}

/// Validates an amount coming from a caller.
pub(crate) fn ensure_valid(amount: f64) -> ResultEngine<()> {
    if !amount.is_finite() {
        return Err(EngineError::InvalidAmount(format!(
            "{amount} is not a finite number"
        )));
    }
    if amount < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "{amount} is negative"
        )));
    }
    Ok(())
}

/// Parses a decimal string typed by a user into an amount.
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`.
///
/// Validation rules:
/// - max 2 fractional digits (rejects `12.345`)
/// - rejects negative, empty and invalid strings
///
/// ```rust
/// use engine::parse_amount;
///
/// assert_eq!(parse_amount("10,5").unwrap(), 10.5);
/// assert!(parse_amount("-3").is_err());
/// ```
pub fn parse_amount(s: &str) -> ResultEngine<f64> {
    let empty = || EngineError::InvalidAmount("empty amount".to_string());
    let invalid = || EngineError::InvalidAmount(format!("invalid amount: {}", s.trim()));
    let overflow = || EngineError::InvalidAmount("amount too large".to_string());

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }
    if trimmed.starts_with('-') {
        return Err(EngineError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }

    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed).trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let units_str = parts.next().ok_or_else(invalid)?;
    let cents_str = parts.next();
    if parts.next().is_some() {
        return Err(invalid());
    }

    if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let units: i64 = units_str.parse().map_err(|_| overflow())?;

    let cents: i64 = match cents_str {
        None | Some("") => 0,
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            match frac.len() {
                1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                2 => frac.parse::<i64>().map_err(|_| invalid())?,
                _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
            }
        }
    };

    let total = units
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(overflow)?;

    Ok(total as f64 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(parse_amount("10").unwrap(), 10.0);
        assert_eq!(parse_amount("10.5").unwrap(), 10.5);
        assert_eq!(parse_amount("10,50").unwrap(), 10.5);
        assert_eq!(parse_amount("+1.00").unwrap(), 1.0);
        assert_eq!(parse_amount("  2.30 ").unwrap(), 2.3);
        assert_eq!(parse_amount("7.").unwrap(), 7.0);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!(parse_amount("12.345").is_err());
        assert!(parse_amount("0.001").is_err());
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert!(parse_amount("-0.01").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("+").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.2.3").is_err());
        assert!(parse_amount(".5").is_err());
    }

    #[test]
    fn ensure_valid_rejects_nan_and_negative() {
        assert!(ensure_valid(f64::NAN).is_err());
        assert!(ensure_valid(f64::INFINITY).is_err());
        assert!(ensure_valid(-1.0).is_err());
        assert!(ensure_valid(0.0).is_ok());
    }

    #[test]
    fn format_rounds_drift_to_zero() {
        assert_eq!(format_amount(0.0), "0.00€");
        assert_eq!(format_amount(1050.0 / 100.0), "10.50€");
        assert_eq!(format_amount(-25.0), "-25.00€");
        assert_eq!(format_amount(-0.0009), "0.00€");
    }
}
