//! # Money Module
//!
//! Provides the `Money` type and the unit helpers used by every screen that
//! shows or accepts a price.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (pence)                             │
//! │    £10.50 is stored as 1050                                            │
//! │    Floats only appear at the edges: user input (to_minor) and          │
//! │    the hourly fraction inside a line total                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quill_core::money::{format_gbp, to_minor, Money};
//!
//! let price = Money::from_minor(1050);
//! assert_eq!(price.to_string(), "£10.50");
//!
//! assert_eq!(to_minor(25.65), 2565);
//! assert_eq!(format_gbp(123456), "£1,234.56");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::BPS_SCALE;

/// Symbol used by [`format_gbp`] and `Display`.
pub const GBP_SYMBOL: &str = "£";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor currency units (pence for GBP).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative line totals are legal (credits, corrections)
/// - **Transparent serde**: serializes as a bare integer, matching the
///   backend's `*Minor` fields
/// - **Saturating ops**: `+`, `-`, negation and `sum` clamp at the i64
///   bounds instead of panicking or wrapping
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (pounds) portion, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn floor_zero(self) -> Self {
        Money(self.0.max(0))
    }

    /// Returns `round(self × bps / 10000)` with ties away from zero.
    ///
    /// Used for both VAT and percent discounts. The product is widened to
    /// i128 so large invoices cannot overflow before the division; a result
    /// outside the i64 range saturates.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::money::Money;
    ///
    /// // 20% VAT on £90.00
    /// assert_eq!(Money::from_minor(9000).apply_bps(2000).minor(), 1800);
    /// // 10% of 25p is 2.5p, which rounds half away from zero
    /// assert_eq!(Money::from_minor(25).apply_bps(1000).minor(), 3);
    /// ```
    pub fn apply_bps(&self, bps: i64) -> Money {
        let scaled = div_round_half_away(self.0 as i128 * bps as i128, BPS_SCALE as i128);
        Money(i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Formats with the given currency symbol, two decimals and comma
    /// thousands separators.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(-123456).format_with("€"), "-€1,234.56");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            group_thousands(self.major().unsigned_abs()),
            self.minor_part()
        )
    }
}

// =============================================================================
// Unit Helpers
// =============================================================================

/// Converts a major-unit amount (e.g. `25.65` pounds) to minor units.
///
/// Non-finite input (NaN, ±∞) becomes 0 so a half-typed form field never
/// poisons a total.
pub fn to_minor(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value * 100.0).round() as i64
}

/// Converts minor units back to a major-unit float for display widgets.
pub fn from_minor(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// Formats minor units as an en-GB currency string: `£1,234.56`.
pub fn format_gbp(minor: i64) -> String {
    Money::from_minor(minor).format_with(GBP_SYMBOL)
}

/// Integer division rounding half away from zero.
pub(crate) fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) != (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(GBP_SYMBOL))
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_parts() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);

        let negative = Money::from_minor(-550);
        assert_eq!(negative.major(), -5);
        assert_eq!(negative.minor_part(), 50);
    }

    #[test]
    fn test_display_gbp() {
        assert_eq!(Money::from_minor(1099).to_string(), "£10.99");
        assert_eq!(Money::from_minor(0).to_string(), "£0.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-£5.50");
        assert_eq!(Money::from_minor(-5).to_string(), "-£0.05");
    }

    #[test]
    fn test_format_gbp_grouping() {
        assert_eq!(format_gbp(100), "£1.00");
        assert_eq!(format_gbp(99_999), "£999.99");
        assert_eq!(format_gbp(100_000), "£1,000.00");
        assert_eq!(format_gbp(123_456_789), "£1,234,567.89");
    }

    #[test]
    fn test_to_minor() {
        assert_eq!(to_minor(10.5), 1050);
        assert_eq!(to_minor(25.65), 2565);
        assert_eq!(to_minor(0.0), 0);
        assert_eq!(to_minor(f64::NAN), 0);
        assert_eq!(to_minor(f64::INFINITY), 0);
    }

    #[test]
    fn test_from_minor() {
        assert!((from_minor(1050) - 10.5).abs() < f64::EPSILON);
        assert!((from_minor(-1) + 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_bps_rounding() {
        assert_eq!(Money::from_minor(10_000).apply_bps(1000).minor(), 1000);
        // 0.5 ties round away from zero in both directions
        assert_eq!(Money::from_minor(5).apply_bps(1000).minor(), 1);
        assert_eq!(Money::from_minor(-5).apply_bps(1000).minor(), -1);
        // just under the tie
        assert_eq!(Money::from_minor(4).apply_bps(1000).minor(), 0);
        assert_eq!(Money::from_minor(777).apply_bps(BPS_SCALE).minor(), 777);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(250);
        assert_eq!((a + b).minor(), 1250);
        assert_eq!((a - b).minor(), 750);
        assert_eq!((-a).minor(), -1000);
        assert_eq!((b - a).floor_zero(), Money::zero());

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 1500);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_minor(i64::MAX);
        let min = Money::from_minor(i64::MIN);
        let one = Money::from_minor(1);

        assert_eq!(max + one, max);
        assert_eq!(min - one, min);
        assert_eq!(-min, max);

        let mut acc = max;
        acc += one;
        assert_eq!(acc, max);
        acc = min;
        acc -= one;
        assert_eq!(acc, min);

        let total: Money = [max, max, one].into_iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_apply_bps_clamps_to_i64() {
        assert_eq!(Money::from_minor(i64::MAX).apply_bps(30_000).minor(), i64::MAX);
        assert_eq!(Money::from_minor(i64::MIN).apply_bps(30_000).minor(), i64::MIN);
        assert_eq!(Money::from_minor(i64::MAX).apply_bps(-30_000).minor(), i64::MIN);
    }
}
