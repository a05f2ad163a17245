//! # Domain Types
//!
//! Core domain types shared by the calculator, the session and the exports.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Addon       │   │    LineItem     │   │   LineTotals    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code           │──►│  unit_price     │──►│  line           │       │
//! │  │  name, unit     │   │  quantity       │   │  tax            │       │
//! │  │  unit_price     │   │  taxable        │   │  total          │       │
//! │  │  default_qty    │   │  included       │   └────────┬────────┘       │
//! │  │  taxable        │   └─────────────────┘            │ Σ included     │
//! │  └─────────────────┘                                  ▼                │
//! │  ┌─────────────────┐                         ┌─────────────────┐       │
//! │  │    TaxRate      │                         │     Totals      │       │
//! │  │  millionths     │                         │  subtotal, tax  │       │
//! │  │  87_500 = 8.75% │                         │  total          │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{to_cents, Amount, Money};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate stored as integer millionths of the taxed amount.
///
/// ## Why Millionths?
/// Basis points (1/10000) cannot hold a rate like 8.875%. Millionths give four
/// decimal places of percentage while keeping tax an exact integer division:
/// ```text
/// 8.75%   → 87_500
/// 8.875%  → 88_750
/// 100%    → 1_000_000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Denominator of the stored value (1_000_000 = 100%).
    pub const SCALE: u32 = 1_000_000;

    /// Creates a tax rate from millionths.
    #[inline]
    pub const fn from_millionths(millionths: u32) -> Self {
        TaxRate(millionths)
    }

    /// Creates a tax rate from basis points (825 = 8.25%).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps.saturating_mul(100))
    }

    /// Creates a tax rate from a percentage. Negative, NaN or infinite
    /// input yields a zero rate.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return TaxRate::zero();
        }
        TaxRate((pct * 10_000.0).round() as u32)
    }

    /// Parses a percentage string exactly ("8.75" → 87_500).
    pub fn parse_percentage(text: &str) -> Option<Self> {
        let value = Decimal::from_str(text.trim()).ok()?;
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }
        value
            .checked_mul(Decimal::from(10_000))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .map(TaxRate)
    }

    /// Interprets a string-or-number percentage; anything malformed is 0%.
    pub fn from_amount(amount: &Amount) -> Self {
        match amount {
            Amount::Number(n) => TaxRate::from_percentage(*n),
            Amount::Text(s) => TaxRate::parse_percentage(s).unwrap_or_default(),
        }
    }

    /// Returns the rate in millionths.
    #[inline]
    pub const fn millionths(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Renders the shortest exact percentage: `8.75%`, `10%`, `8.875%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 10_000;
        let frac = self.0 % 10_000;
        if frac == 0 {
            return write!(f, "{}%", whole);
        }
        let digits = format!("{:04}", frac);
        write!(f, "{}.{}%", whole, digits.trim_end_matches('0'))
    }
}

// =============================================================================
// Addon (catalog record)
// =============================================================================

fn default_quantity() -> u32 {
    1
}

/// One entry of the add-on catalog (`seeds/add_ons.json`).
///
/// ```json
/// {"code": "EXT-5LB", "name": "5 lb extinguisher", "unit": "each",
///  "unit_price": 15.95, "default_quantity": 2, "taxable": true}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Addon {
    /// Business identifier, unique within a catalog.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Unit of measure ("each", "per device", "hour").
    #[serde(default)]
    pub unit: String,

    /// Price per unit, decimal string or number.
    pub unit_price: Amount,

    /// Quantity pre-filled by the pricing UIs. Zero means "offered but not
    /// selected by default".
    #[serde(default = "default_quantity")]
    pub default_quantity: u32,

    /// Whether the configured tax rate applies.
    #[serde(default)]
    pub taxable: bool,
}

impl Addon {
    /// Unit price in cents.
    #[inline]
    pub fn unit_price_cents(&self) -> Money {
        to_cents(&self.unit_price)
    }

    /// The line item a pricing session starts with for this add-on.
    ///
    /// ## Default Selection
    /// - `included` when `default_quantity > 0`
    /// - `quantity = default_quantity`, or 1 when the default is zero, so
    ///   ticking the item later prices one unit
    pub fn default_line_item(&self) -> LineItem {
        LineItem {
            unit_price: self.unit_price.clone(),
            quantity: if self.default_quantity > 0 {
                self.default_quantity
            } else {
                1
            },
            taxable: self.taxable,
            included: self.default_quantity > 0,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One purchasable add-on selected for pricing.
///
/// `included` may be toggled without touching `quantity` or `unit_price`;
/// an excluded item simply contributes nothing to totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub unit_price: Amount,
    pub quantity: u32,
    pub taxable: bool,
    pub included: bool,
}

impl LineItem {
    /// Creates an included line item.
    pub fn new(unit_price: impl Into<Amount>, quantity: u32, taxable: bool) -> Self {
        LineItem {
            unit_price: unit_price.into(),
            quantity,
            taxable,
            included: true,
        }
    }

    /// Returns this item with `included = false`.
    pub fn excluded(mut self) -> Self {
        self.included = false;
        self
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Result of pricing one line: `{line, tax, total}` in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineTotals {
    /// `unit_price × quantity`, before tax.
    pub line: Money,
    pub tax: Money,
    /// `line + tax`.
    pub total: Money,
}

impl LineTotals {
    pub const fn zero() -> Self {
        LineTotals {
            line: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
        }
    }
}

/// Aggregate over included line items: `{subtotal, tax, total}` in cents.
///
/// Derived, never stored: recomputed from the items and rate on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl Totals {
    pub const fn zero() -> Self {
        Totals {
            subtotal: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
        }
    }

    /// Adds one line's contribution.
    pub fn add_line(&mut self, line: &LineTotals) {
        self.subtotal += line.line;
        self.tax += line.tax;
        self.total += line.total;
    }

    pub fn is_zero(&self) -> bool {
        self.subtotal.is_zero() && self.tax.is_zero() && self.total.is_zero()
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Totals {
            subtotal: self.subtotal + other.subtotal,
            tax: self.tax + other.tax,
            total: self.total + other.total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_constructors_agree() {
        assert_eq!(TaxRate::from_percentage(8.75).millionths(), 87_500);
        assert_eq!(TaxRate::from_bps(875), TaxRate::from_percentage(8.75));
        assert_eq!(TaxRate::parse_percentage("8.75"), Some(TaxRate::from_bps(875)));
        assert_eq!(TaxRate::parse_percentage("8.875").unwrap().millionths(), 88_750);
        assert!((TaxRate::from_bps(825).percentage() - 8.25).abs() < 0.0001);
    }

    #[test]
    fn test_tax_rate_malformed_is_zero() {
        assert!(TaxRate::from_percentage(-1.0).is_zero());
        assert!(TaxRate::from_percentage(f64::NAN).is_zero());
        assert!(TaxRate::from_amount(&Amount::from("abc")).is_zero());
        assert_eq!(TaxRate::parse_percentage("-3"), None);
    }

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_percentage(8.75).to_string(), "8.75%");
        assert_eq!(TaxRate::from_percentage(10.0).to_string(), "10%");
        assert_eq!(TaxRate::from_millionths(88_750).to_string(), "8.875%");
        assert_eq!(TaxRate::zero().to_string(), "0%");
    }

    #[test]
    fn test_addon_defaults_when_fields_missing() {
        let addon: Addon =
            serde_json::from_str(r#"{"code": "X", "name": "Thing", "unit_price": "2.50"}"#).unwrap();
        assert_eq!(addon.default_quantity, 1);
        assert!(!addon.taxable);
        assert_eq!(addon.unit, "");
        assert_eq!(addon.unit_price_cents().cents(), 250);
    }

    #[test]
    fn test_default_line_item_selection() {
        let mut addon: Addon = serde_json::from_str(
            r#"{"code": "X", "name": "Thing", "unit_price": 6.0, "default_quantity": 10}"#,
        )
        .unwrap();
        let item = addon.default_line_item();
        assert!(item.included);
        assert_eq!(item.quantity, 10);

        addon.default_quantity = 0;
        let item = addon.default_line_item();
        assert!(!item.included);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_totals_accumulate() {
        let mut totals = Totals::zero();
        assert!(totals.is_zero());
        totals.add_line(&LineTotals {
            line: Money::from_cents(2000),
            tax: Money::from_cents(200),
            total: Money::from_cents(2200),
        });
        assert_eq!(totals.subtotal.cents(), 2000);
        assert_eq!(totals.tax.cents(), 200);
        assert_eq!(totals.total.cents(), 2200);
    }
}
