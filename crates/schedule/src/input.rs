//! Parsing of raw form input into schedule inputs.

use core::str::FromStr;

use rust_decimal::Decimal;

/// Parse an installment count typed into a form.
///
/// Empty, non-numeric, and non-positive input all yield `None`; a count is
/// never coerced to 1.
pub fn parse_installments(raw: &str) -> Option<u32> {
    let value: i64 = raw.trim().parse().ok()?;
    if value < 1 {
        return None;
    }
    u32::try_from(value).ok()
}

/// Parse a monetary amount typed into a form.
///
/// Thousands separators (`,`) and surrounding whitespace are ignored. Returns
/// `None` for empty or non-numeric input; sign is preserved so the caller's
/// guard can reject non-positive amounts explicitly.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
