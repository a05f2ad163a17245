//! # Money Module
//!
//! Provides the `Money` type and the one sanctioned way of turning a
//! decimal price into integer cents.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    19.99 * 100 = 1998.9999999999998  ❌ NOT 1999                        │
//! │    0.1 + 0.2   = 0.30000000000000004                                    │
//! │                                                                         │
//! │  OUR SOLUTION: convert ONCE, then integers only                        │
//! │    "19.99" ──to_cents()──► 1999 ──× qty──► 5997 ──tax──► 525           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cavefire_core::money::{to_cents, Amount, Money};
//!
//! let price = to_cents(&Amount::from("19.99"));
//! assert_eq!(price, Money::from_cents(1999));
//!
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.to_string(), "$59.97");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Rounding Policy
// =============================================================================

/// How a fractional cent is resolved.
///
/// ## Policy
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  HALF AWAY FROM ZERO (default, contractual)                         │
/// │    524.5 → 525    524.4999 → 524    0.5 → 1                         │
/// │                                                                     │
/// │  HALF EVEN (opt-in, bankers rounding)                               │
/// │    524.5 → 524    525.5 → 526       0.5 → 0                         │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
/// Only exact midpoints differ between the two modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// 0.5 rounds away from zero.
    #[default]
    HalfAwayFromZero,
    /// 0.5 rounds to the nearest even integer (bankers rounding).
    HalfEven,
}

impl Rounding {
    /// Divides `numerator` by a positive `denominator`, rounding the
    /// quotient according to this policy.
    pub(crate) fn divide(self, numerator: i128, denominator: i128) -> i128 {
        debug_assert!(denominator > 0, "denominator must be positive");

        // Integer division truncates toward zero; decide whether to step away.
        let quotient = numerator / denominator;
        let twice_remainder = (numerator % denominator).abs() * 2;

        let step_away = match self {
            Rounding::HalfAwayFromZero => twice_remainder >= denominator,
            Rounding::HalfEven => {
                twice_remainder > denominator
                    || (twice_remainder == denominator && quotient % 2 != 0)
            }
        };

        match (step_away, numerator < 0) {
            (false, _) => quotient,
            (true, false) => quotient + 1,
            (true, true) => quotient - 1,
        }
    }

    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rounding::HalfAwayFromZero => write!(f, "half_away_from_zero"),
            Rounding::HalfEven => write!(f, "half_even"),
        }
    }
}

impl FromStr for Rounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "half_away_from_zero" | "half_up" | "standard" => Ok(Rounding::HalfAwayFromZero),
            "half_even" | "bankers" => Ok(Rounding::HalfEven),
            other => Err(format!(
                "Unknown rounding mode: '{}'. Valid options: half_away_from_zero, half_even",
                other
            )),
        }
    }
}

// =============================================================================
// Amount (decimal input as string or number)
// =============================================================================

/// A decimal currency amount as it arrives from JSON: `"19.99"` or `19.99`.
///
/// Catalog files and browser payloads use both spellings, so the type keeps
/// whichever was given and defers interpretation to [`to_cents`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Converts to integer cents. See [`to_cents`].
    pub fn cents(&self) -> Money {
        to_cents(self)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Number(0.0)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Text(value)
    }
}

impl From<Money> for Amount {
    fn from(value: Money) -> Self {
        Amount::Text(value.to_decimal_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

/// Converts a decimal amount into integer cents: `round(amount * 100)`,
/// rounding half away from zero.
///
/// ## Contract
/// ```text
/// "19.99"  → 1999        19.99 → 1999      "1.005" → 101
/// "abc"    → 0           -5    → 0         NaN     → 0
/// ```
/// Malformed, negative or non-finite input is out of contract and degrades to
/// zero instead of propagating an error; callers surface validation warnings.
///
/// Numbers are converted through their shortest decimal representation, so a
/// JSON `19.99` and a JSON `"19.99"` always produce the same cents.
pub fn to_cents(amount: &Amount) -> Money {
    let cents = match amount {
        Amount::Text(text) => Money::parse_decimal(text),
        Amount::Number(n) if n.is_finite() && *n >= 0.0 => Money::parse_decimal(&n.to_string()),
        Amount::Number(_) => None,
    };
    cents.unwrap_or_default()
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Addon.unit_price ──to_cents──► LineItem ──► LineTotals ──► Totals      │
/// │                                                 │                       │
/// │                                                 └──► CSV / HTML "$5.25" │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use cavefire_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal string ("19.99", "6", "1.5e1") into cents.
    ///
    /// Returns `None` for empty, unparseable or negative input, and for
    /// values that do not fit in `i64` cents.
    pub fn parse_decimal(text: &str) -> Option<Money> {
        Self::parse_decimal_with(text, Rounding::HalfAwayFromZero)
    }

    /// Same as [`Money::parse_decimal`] with an explicit rounding policy for
    /// sub-cent digits.
    pub fn parse_decimal_with(text: &str, rounding: Rounding) -> Option<Money> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()?;
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }

        value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, rounding.strategy())
            .to_i64()
            .map(Money)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Multiplies by a quantity. Exact for every realistic input; saturates
    /// instead of wrapping on overflow.
    ///
    /// ```rust
    /// use cavefire_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1999).multiply_quantity(3).cents(), 5997);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Calculates tax on this amount, rounding half away from zero.
    ///
    /// ## Implementation
    /// Rates are integer millionths (8.75% = 87_500), so the tax is
    /// `amount × rate / 1_000_000` computed entirely in `i128`:
    /// ```text
    /// 5997 × 87_500 = 524_737_500
    /// 524_737_500 / 1_000_000 = 524.7375 → 525
    /// ```
    ///
    /// ```rust
    /// use cavefire_core::money::Money;
    /// use cavefire_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(5997).calculate_tax(TaxRate::from_percentage(8.75));
    /// assert_eq!(tax.cents(), 525);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.calculate_tax_with(rate, Rounding::HalfAwayFromZero)
    }

    /// Calculates tax with an explicit rounding policy.
    pub fn calculate_tax_with(&self, rate: TaxRate, rounding: Rounding) -> Money {
        let scaled = self.0 as i128 * rate.millionths() as i128;
        let tax = rounding.divide(scaled, TaxRate::SCALE as i128);
        Money(i64::try_from(tax).unwrap_or(i64::MAX))
    }

    /// Formats as a plain two-decimal string without currency symbol
    /// (`"19.99"`), the shape used in CSV cells.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display renders `$19.99` / `-$5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
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
    fn test_to_cents_from_text() {
        assert_eq!(to_cents(&Amount::from("19.99")).cents(), 1999);
        assert_eq!(to_cents(&Amount::from("6")).cents(), 600);
        assert_eq!(to_cents(&Amount::from(" 15.95 ")).cents(), 1595);
        assert_eq!(to_cents(&Amount::from("1.5e1")).cents(), 1500);
    }

    #[test]
    fn test_to_cents_from_number_avoids_float_drift() {
        // 19.99 * 100 in f64 is 1998.9999999999998
        assert_eq!(to_cents(&Amount::from(19.99)).cents(), 1999);
        assert_eq!(to_cents(&Amount::from(15.95)).cents(), 1595);
        assert_eq!(to_cents(&Amount::from(0.1)).cents(), 10);
    }

    #[test]
    fn test_to_cents_rounds_half_away_from_zero() {
        assert_eq!(to_cents(&Amount::from("1.005")).cents(), 101);
        assert_eq!(to_cents(&Amount::from("1.004")).cents(), 100);
        assert_eq!(to_cents(&Amount::from(2.675)).cents(), 268);
    }

    #[test]
    fn test_to_cents_degrades_to_zero() {
        assert_eq!(to_cents(&Amount::from("abc")).cents(), 0);
        assert_eq!(to_cents(&Amount::from("")).cents(), 0);
        assert_eq!(to_cents(&Amount::from("-5.00")).cents(), 0);
        assert_eq!(to_cents(&Amount::from(-5.0)).cents(), 0);
        assert_eq!(to_cents(&Amount::from(f64::NAN)).cents(), 0);
        assert_eq!(to_cents(&Amount::from(f64::INFINITY)).cents(), 0);
    }

    #[test]
    fn test_amount_deserializes_string_or_number() {
        let text: Amount = serde_json::from_str("\"19.99\"").unwrap();
        let number: Amount = serde_json::from_str("19.99").unwrap();
        assert_eq!(text, Amount::Text("19.99".to_string()));
        assert_eq!(text.cents(), number.cents());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(6522).to_decimal_string(), "65.22");
        assert_eq!(Money::from_cents(5).to_decimal_string(), "0.05");
    }

    #[test]
    fn test_tax_rounding_modes() {
        // 100 cents at 0.5% = 0.5 cents: the one case where modes disagree
        let amount = Money::from_cents(100);
        let rate = TaxRate::from_percentage(0.5);
        assert_eq!(amount.calculate_tax(rate).cents(), 1);
        assert_eq!(amount.calculate_tax_with(rate, Rounding::HalfEven).cents(), 0);

        // 300 cents at 0.5% = 1.5 cents: both round to 2
        let amount = Money::from_cents(300);
        assert_eq!(amount.calculate_tax(rate).cents(), 2);
        assert_eq!(amount.calculate_tax_with(rate, Rounding::HalfEven).cents(), 2);
    }

    #[test]
    fn test_rounding_divide_negative_numerator() {
        assert_eq!(Rounding::HalfAwayFromZero.divide(-15, 10), -2);
        assert_eq!(Rounding::HalfEven.divide(-15, 10), -2);
        assert_eq!(Rounding::HalfEven.divide(-25, 10), -2);
        assert_eq!(Rounding::HalfAwayFromZero.divide(-14, 10), -1);
    }

    #[test]
    fn test_rounding_parse() {
        assert_eq!("half_even".parse::<Rounding>().unwrap(), Rounding::HalfEven);
        assert_eq!("bankers".parse::<Rounding>().unwrap(), Rounding::HalfEven);
        assert_eq!(
            "HALF_AWAY_FROM_ZERO".parse::<Rounding>().unwrap(),
            Rounding::HalfAwayFromZero
        );
        assert!("truncate".parse::<Rounding>().is_err());
    }

    #[test]
    fn test_multiply_and_sum() {
        let line = Money::from_cents(299).multiply_quantity(3);
        assert_eq!(line.cents(), 897);

        let total: Money = [Money::from_cents(100), Money::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 350);
    }
}
