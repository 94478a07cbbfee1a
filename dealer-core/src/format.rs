//! Locale formatting for amounts, percentages and dates shown to staff.
//!
//! Amounts are whole pesos grouped with `.`; percentages use `,` as the
//! decimal separator.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use dealer_core::format::{format_currency, format_percent};
//!
//! assert_eq!(format_currency(Some(dec!(14000000))), "$ 14.000.000");
//! assert_eq!(format_currency(None), "-");
//! assert_eq!(format_percent(dec!(29.6296), 1), "29,6 %");
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;

/// Placeholder shown for absent values.
pub const EMPTY: &str = "-";

/// Groups the digits of a non-negative integer string with `.`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `$ 14.000.000`, `-$ 1.000`, or `-` when there is no amount.
///
/// Rounds to whole units, midpoints away from zero.
pub fn format_currency(amount: Option<Decimal>) -> String {
    let Some(amount) = amount else {
        return EMPTY.to_string();
    };
    let rounded = round_half_up(amount, 0);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}$ {}", group_thousands(&digits))
}

/// Integer with thousands grouping, e.g. mileage `85.000`.
pub fn format_number(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `29,6 %` for `dp = 1`.
pub fn format_percent(
    value: Decimal,
    dp: u32,
) -> String {
    let rounded = round_half_up(value, dp);
    let text = format!("{:.*}", dp as usize, rounded);
    format!("{} %", text.replace('.', ","))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Reads a thousands-grouped amount as typed into a form.
///
/// Every non-digit is dropped, so `"$ 14.000.000"` reads as 14000000.
/// Empty input reads as zero.
pub fn parse_amount(input: &str) -> Decimal {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Decimal::ZERO;
    }
    digits.parse().unwrap_or_else(|e| {
        tracing::warn!(input = %input, "amount out of range: {}", e);
        Decimal::ZERO
    })
}
