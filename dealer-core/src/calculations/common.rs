//! Common utility functions for dealership calculations.
//!
//! Shared helpers used by the document, profitability and summary
//! calculators, including rounding and totals.

use rust_decimal::Decimal;

/// Rounds a decimal value to `dp` decimal places using half-up rounding.
///
/// Values at exactly the midpoint are rounded away from zero, matching the
/// way amounts are shown to staff.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use dealer_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(29.6296), 1), dec!(29.6));
/// assert_eq!(round_half_up(dec!(1500.5), 0), dec!(1501));
/// assert_eq!(round_half_up(dec!(-1500.5), 0), dec!(-1501)); // Away from zero
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Sums a sequence of amounts. An empty sequence sums to zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use dealer_core::calculations::common::sum;
///
/// assert_eq!(sum([dec!(500000), dec!(300000)]), dec!(800000));
/// assert_eq!(sum(Vec::new()), dec!(0));
/// ```
pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, a| acc + a)
}

/// `numerator / denominator * 100`, or zero when the denominator is not
/// positive.
pub fn percent_of(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}
