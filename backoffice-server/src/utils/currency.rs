//! Currency display formatting
//!
//! Amounts travel through the API as raw `f64` plus a pre-formatted
//! string; formatting happens only here, never inside aggregation.

/// Format an amount with thousands separators and the configured symbol,
/// e.g. `format_amount(1234567.0, "₫")` → `"1.234.567 ₫"`.
///
/// Fractional parts are rendered only when present (two decimal places,
/// comma separator), matching receipt conventions for VND-style amounts.
pub fn format_amount(amount: f64, symbol: &str) -> String {
    let negative = amount < 0.0;
    let abs = amount.abs();
    let whole = abs.trunc() as i64;
    let frac = ((abs.fract() * 100.0).round() as i64) % 100;

    let mut digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    while digits.len() > 3 {
        let rest = digits.split_off(digits.len() - 3);
        grouped = if grouped.is_empty() {
            rest
        } else {
            format!("{}.{}", rest, grouped)
        };
    }
    grouped = if grouped.is_empty() {
        digits
    } else {
        format!("{}.{}", digits, grouped)
    };

    let sign = if negative { "-" } else { "" };
    if frac > 0 {
        format!("{}{},{:02} {}", sign, grouped, frac, symbol)
    } else {
        format!("{}{} {}", sign, grouped, symbol)
    }
}
