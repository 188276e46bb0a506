//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  A visit total is summed from service prices and later compared with   │
//! │  the sum of its line items. Both sides must agree to the cent.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    2000 + 1500 = 3500 cents, always                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The hosted backend stores amounts as `numeric`. We never go through `f64`:
//! amounts leave as decimal text (`"35.00"`) via [`Money::to_decimal_string`]
//! and come back through [`Money::parse_decimal`].
//!
//! ## Usage
//! ```rust
//! use barber_core::money::Money;
//!
//! let haircut = Money::from_cents(2000); // $20.00
//! let beard = Money::from_major_minor(15, 0);
//! let total = haircut + beard;
//! assert_eq!(total.to_decimal_string(), "35.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use barber_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -$5.50.
    ///
    /// ## Example
    /// ```rust
    /// use barber_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Renders the amount as plain decimal text with two fraction digits.
    ///
    /// ## Example
    /// ```rust
    /// use barber_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(3500).to_decimal_string(), "35.00");
    /// assert_eq!(Money::from_cents(-50).to_decimal_string(), "-0.50");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }

    /// Parses decimal text as produced by the backend's `numeric` columns.
    ///
    /// ## Rules
    /// - Optional leading sign, digits, optional `.` and fraction digits
    /// - Digits past the second fraction digit round half-up
    /// - Anything else (exponents, separators, empty input) is `None`
    ///
    /// ## Example
    /// ```rust
    /// use barber_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("19.99"), Some(Money::from_cents(1999)));
    /// assert_eq!(Money::parse_decimal("20"), Some(Money::from_cents(2000)));
    /// assert_eq!(Money::parse_decimal("12.345"), Some(Money::from_cents(1235)));
    /// assert_eq!(Money::parse_decimal("abc"), None);
    /// ```
    pub fn parse_decimal(text: &str) -> Option<Money> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

        let mut fraction_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tens = fraction_digits.next().unwrap_or(0);
        let ones = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().is_some_and(|d| d >= 5);

        let cents = whole
            .checked_mul(100)?
            .checked_add(tens * 10 + ones + i64::from(round_up))?;

        Some(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in a human-readable format (debugging and CLI output).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Summing line amounts into a visit total.
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(35, 0).cents(), 3500);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(3500).to_decimal_string(), "35.00");
        assert_eq!(Money::from_cents(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_cents(-50).to_decimal_string(), "-0.50");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("20"), Some(Money::from_cents(2000)));
        assert_eq!(Money::parse_decimal("19.5"), Some(Money::from_cents(1950)));
        assert_eq!(Money::parse_decimal(" 0.05 "), Some(Money::from_cents(5)));
        assert_eq!(Money::parse_decimal(".75"), Some(Money::from_cents(75)));
        assert_eq!(Money::parse_decimal("-3.20"), Some(Money::from_cents(-320)));
        assert_eq!(Money::parse_decimal("12.344"), Some(Money::from_cents(1234)));
        assert_eq!(Money::parse_decimal("12.345"), Some(Money::from_cents(1235)));

        assert_eq!(Money::parse_decimal(""), None);
        assert_eq!(Money::parse_decimal("."), None);
        assert_eq!(Money::parse_decimal("1e3"), None);
        assert_eq!(Money::parse_decimal("1,000.00"), None);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(2000);
        let b = Money::from_cents(1500);

        assert_eq!((a + b).cents(), 3500);
        assert_eq!((a - b).cents(), 500);

        let total: Money = vec![a, b, Money::zero()].into_iter().sum();
        assert_eq!(total, Money::from_cents(3500));
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::default(), Money::zero());
    }
}
