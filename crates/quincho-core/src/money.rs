//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Accumulating cart subtotals in floats drifts by fractions of a cent   │
//! │  over a day of sales. OUR SOLUTION: integer cents.                     │
//! │    3 × 1050 cents = 3150 cents, exactly, every time.                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary value in the system flows through this type: product
//! prices, cart subtotals, order totals, receipt amounts, inventory
//! valuation. Only the formatting helpers produce display strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major units (whole pesos/dollars).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Parses a decimal currency string ("15000", "15000.5", "15000.50").
    ///
    /// ## Coercion Contract
    /// Returns `None` for anything unparseable. Callers that take register
    /// input coerce `None` to `Money::zero()` rather than failing the
    /// request — a cashier typo must never lose the order.
    ///
    /// ## Example
    /// ```rust
    /// use quincho_core::money::Money;
    ///
    /// assert_eq!(Money::parse("15000"), Some(Money::from_cents(1_500_000)));
    /// assert_eq!(Money::parse("99.9"), Some(Money::from_cents(9990)));
    /// assert_eq!(Money::parse("abc"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Money> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (major_part, minor_part) = match s.split_once('.') {
            Some((maj, min)) => (maj, min),
            None => (s, ""),
        };

        if major_part.is_empty() && minor_part.is_empty() {
            return None;
        }
        if !major_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        // More than 2 fractional digits is not a currency amount
        if minor_part.len() > 2 || !minor_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let major: i64 = if major_part.is_empty() {
            0
        } else {
            major_part.parse().ok()?
        };
        let minor: i64 = match minor_part.len() {
            0 => 0,
            1 => minor_part.parse::<i64>().ok()? * 10,
            _ => minor_part.parse().ok()?,
        };

        let cents = major.checked_mul(100)?.checked_add(minor)?;
        Some(Money(if negative { -cents } else { cents }))
    }

    /// Plain 2-decimal representation without grouping: `15000.00`.
    ///
    /// Used for CSV export cells where the value must stay machine-parseable.
    pub fn format_plain(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor())
    }

    /// Thousands-grouped 2-decimal representation: `15,000.00`.
    ///
    /// Used for the printable receipt and other human-facing amounts.
    pub fn format_grouped(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let major = self.major().abs().to_string();
        let mut grouped = String::with_capacity(major.len() + major.len() / 3);
        for (i, c) in major.chars().enumerate() {
            if i > 0 && (major.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        format!("{}{}.{:02}", sign, grouped, self.minor())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs. Exports use the explicit format helpers.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
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

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_parse_whole_amount() {
        assert_eq!(Money::parse("15000"), Some(Money::from_cents(1_500_000)));
        assert_eq!(Money::parse(" 500 "), Some(Money::from_cents(50_000)));
        assert_eq!(Money::parse("0"), Some(Money::zero()));
    }

    #[test]
    fn test_parse_fractional_amount() {
        assert_eq!(Money::parse("10.99"), Some(Money::from_cents(1099)));
        assert_eq!(Money::parse("10.9"), Some(Money::from_cents(1090)));
        assert_eq!(Money::parse(".50"), Some(Money::from_cents(50)));
        assert_eq!(Money::parse("-5.50"), Some(Money::from_cents(-550)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("abc"), None);
        assert_eq!(Money::parse("10.999"), None);
        assert_eq!(Money::parse("10,50"), None);
        assert_eq!(Money::parse("."), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(Money::from_cents(1_500_000).format_plain(), "15000.00");
        assert_eq!(Money::from_cents(990).format_plain(), "9.90");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(Money::from_cents(1_500_000).format_grouped(), "15,000.00");
        assert_eq!(Money::from_cents(123_456_789).format_grouped(), "1,234,567.89");
        assert_eq!(Money::from_cents(990).format_grouped(), "9.90");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.multiply_quantity(2).cents(), 2000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [1000, 250, 50].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 1300);
    }
}
