//! # Pricing Calculator
//!
//! The single implementation of line and aggregate totals. Every surface
//! (session, compose, CSV export, HTTP API) prices through this module.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItem { unit_price: "19.99", quantity: 3, taxable, included }       │
//! │       │                                                                 │
//! │       ▼  to_cents (once)                                                │
//! │  unit = 1999                                                            │
//! │       │                                                                 │
//! │       ▼  line_totals                                                    │
//! │  line  = 1999 × 3                  = 5997   (exact)                     │
//! │  tax   = round(5997 × 8.75 / 100)  = 525    (per line, then summed)     │
//! │  total = 5997 + 525                = 6522                               │
//! │       │                                                                 │
//! │       ▼  aggregate (included only)                                      │
//! │  Totals { subtotal: Σ line, tax: Σ tax, total: Σ total }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each line is rounded independently and summed as integers, so the result
//! does not depend on item order and never accumulates float error.

use serde::{Deserialize, Serialize};

use crate::money::{to_cents, Money, Rounding};
use crate::types::{LineItem, LineTotals, TaxRate, Totals};

/// Stateless calculator parameterised by a rounding policy.
///
/// `Calculator::default()` rounds half away from zero, which is the
/// contractual behavior. `HalfEven` exists only to reproduce older golden
/// values that were rounded to even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Calculator {
    rounding: Rounding,
}

impl Calculator {
    pub const fn new(rounding: Rounding) -> Self {
        Calculator { rounding }
    }

    #[inline]
    pub const fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Prices one line.
    ///
    /// ```rust
    /// use cavefire_core::money::Money;
    /// use cavefire_core::pricing::Calculator;
    /// use cavefire_core::types::TaxRate;
    ///
    /// let calc = Calculator::default();
    /// let line = calc.line_totals(Money::from_cents(1999), 3, true, TaxRate::from_bps(875));
    /// assert_eq!(line.line.cents(), 5997);
    /// assert_eq!(line.tax.cents(), 525);
    /// assert_eq!(line.total.cents(), 6522);
    /// ```
    pub fn line_totals(
        &self,
        unit_price: Money,
        quantity: u32,
        taxable: bool,
        rate: TaxRate,
    ) -> LineTotals {
        let line = unit_price.multiply_quantity(quantity);
        let tax = if taxable {
            line.calculate_tax_with(rate, self.rounding)
        } else {
            Money::zero()
        };

        LineTotals {
            line,
            tax,
            total: line + tax,
        }
    }

    /// Prices a line item regardless of its `included` flag.
    pub fn item_totals(&self, item: &LineItem, rate: TaxRate) -> LineTotals {
        self.line_totals(to_cents(&item.unit_price), item.quantity, item.taxable, rate)
    }

    /// What a line item adds to the aggregate: its totals when included,
    /// zero otherwise.
    pub fn contribution(&self, item: &LineItem, rate: TaxRate) -> LineTotals {
        if item.included {
            self.item_totals(item, rate)
        } else {
            LineTotals::zero()
        }
    }

    /// Sums the contributions of every item. Empty input, or input with
    /// nothing included, yields all-zero totals.
    pub fn aggregate<'a, I>(&self, items: I, rate: TaxRate) -> Totals
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        items.into_iter().fold(Totals::zero(), |mut totals, item| {
            totals.add_line(&self.contribution(item, rate));
            totals
        })
    }
}

/// Prices one line with the default (half away from zero) policy.
pub fn line_totals(unit_price: Money, quantity: u32, taxable: bool, rate: TaxRate) -> LineTotals {
    Calculator::default().line_totals(unit_price, quantity, taxable, rate)
}

/// Aggregates included items with the default policy.
pub fn aggregate(items: &[LineItem], rate: TaxRate) -> Totals {
    Calculator::default().aggregate(items, rate)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Amount;

    fn rate(pct: f64) -> TaxRate {
        TaxRate::from_percentage(pct)
    }

    #[test]
    fn test_worked_example_19_99_times_3() {
        let unit = to_cents(&Amount::from(19.99));
        assert_eq!(unit.cents(), 1999);

        let line = line_totals(unit, 3, true, rate(8.75));
        assert_eq!(line.line.cents(), 5997);
        assert_eq!(line.tax.cents(), 525);
        assert_eq!(line.total.cents(), 6522);
    }

    #[test]
    fn test_non_taxable_has_no_tax() {
        let line = line_totals(Money::from_cents(600), 10, false, rate(8.75));
        assert_eq!(line.tax.cents(), 0);
        assert_eq!(line.total.cents(), 6000);
    }

    #[test]
    fn test_extinguisher_pair() {
        // 15.95 × 2 = 31.90; 8.75% of 31.90 = 2.79125 → 2.79
        let line = line_totals(Money::from_cents(1595), 2, true, rate(8.75));
        assert_eq!(line.tax.cents(), 279);
        assert_eq!(line.total.cents(), 3469);
    }

    #[test]
    fn test_zero_quantity_is_all_zero() {
        let line = line_totals(Money::from_cents(123_456), 0, true, rate(25.0));
        assert_eq!(line, LineTotals::zero());
    }

    #[test]
    fn test_aggregate_excludes_item() {
        let items = vec![
            LineItem::new(Money::from_cents(1000), 2, true),
            LineItem::new(Money::from_cents(500), 1, false).excluded(),
        ];

        let totals = aggregate(&items, rate(10.0));
        assert_eq!(totals.subtotal.cents(), 2000);
        assert_eq!(totals.tax.cents(), 200);
        assert_eq!(totals.total.cents(), 2200);

        // The excluded item keeps its stored values
        assert_eq!(items[1].quantity, 1);
        assert_eq!(to_cents(&items[1].unit_price).cents(), 500);
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[], rate(8.75)), Totals::zero());

        let none_included = vec![LineItem::new("5.00", 3, true).excluded()];
        assert_eq!(aggregate(&none_included, rate(8.75)), Totals::zero());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let items = vec![
            LineItem::new("19.99", 3, true),
            LineItem::new("6.00", 10, false),
        ];
        let first = aggregate(&items, rate(8.75));
        let second = aggregate(&items, rate(8.75));
        assert_eq!(first, second);
        assert_eq!(first.subtotal.cents(), 5997 + 6000);
    }

    #[test]
    fn test_malformed_price_contributes_zero() {
        let items = vec![
            LineItem::new("not a price", 4, true),
            LineItem::new("1.00", 1, false),
        ];
        let totals = aggregate(&items, rate(8.75));
        assert_eq!(totals.subtotal.cents(), 100);
        assert_eq!(totals.total.cents(), 100);
    }

    #[test]
    fn test_half_even_calculator() {
        // 100 cents at 0.5% is exactly half a cent
        let calc = Calculator::new(Rounding::HalfEven);
        let line = calc.line_totals(Money::from_cents(100), 1, true, rate(0.5));
        assert_eq!(line.tax.cents(), 0);

        let line = line_totals(Money::from_cents(100), 1, true, rate(0.5));
        assert_eq!(line.tax.cents(), 1);
    }
}
