use rust_decimal::Decimal;
use std::str::FromStr;

/// Strips currency markers and annotation noise from a raw field and
/// parses the remainder as a decimal amount.
///
/// `None` means the field carries no usable number. Callers count it as
/// zero when summing distributions and never use it as a NAV; it is not
/// an error.
pub fn clean_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
