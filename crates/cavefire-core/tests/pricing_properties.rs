//! Property-based tests for the calculator contract
//!
//! Validates:
//! - total = p*q + round(p*q*r/100), half away from zero
//! - Non-taxable lines carry no tax at any rate
//! - Empty and fully-excluded inputs aggregate to zero
//! - Exclusion removes a contribution without touching the item
//! - Aggregation is idempotent and independent of item order

use cavefire_core::{aggregate, line_totals, to_cents, Amount, LineItem, Money, TaxRate, Totals};
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Reference tax computed with exact decimals
fn expected_tax(line_cents: i64, rate_millionths: u32) -> i64 {
    let line = Decimal::from(line_cents);
    let rate = Decimal::from(rate_millionths) / Decimal::from(1_000_000);
    (line * rate)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap()
}

fn item_strategy() -> impl Strategy<Value = LineItem> {
    (0i64..1_000_000i64, 0u32..500u32, any::<bool>(), any::<bool>()).prop_map(
        |(cents, quantity, taxable, included)| {
            let mut item = LineItem::new(Money::from_cents(cents), quantity, taxable);
            item.included = included;
            item
        },
    )
}

proptest! {
    #[test]
    fn test_taxable_total_matches_exact_rounding(
        price_cents in 0i64..10_000_000i64,   // $0 to $100,000
        quantity in 0u32..10_000u32,
        rate_millionths in 0u32..300_000u32   // 0% to 30%
    ) {
        let rate = TaxRate::from_millionths(rate_millionths);
        let result = line_totals(Money::from_cents(price_cents), quantity, true, rate);

        let line = price_cents * quantity as i64;
        let tax = expected_tax(line, rate_millionths);

        prop_assert_eq!(result.line.cents(), line);
        prop_assert_eq!(result.tax.cents(), tax);
        prop_assert_eq!(result.total.cents(), line + tax);
    }

    #[test]
    fn test_non_taxable_has_zero_tax(
        price_cents in 0i64..10_000_000i64,
        quantity in 0u32..10_000u32,
        rate_millionths in 0u32..1_000_000u32
    ) {
        let rate = TaxRate::from_millionths(rate_millionths);
        let result = line_totals(Money::from_cents(price_cents), quantity, false, rate);

        prop_assert_eq!(result.tax.cents(), 0);
        prop_assert_eq!(result.total, result.line);
    }

    #[test]
    fn test_zero_quantity_is_zero(
        price_cents in 0i64..10_000_000i64,
        taxable in any::<bool>(),
        rate_millionths in 0u32..1_000_000u32
    ) {
        let rate = TaxRate::from_millionths(rate_millionths);
        let result = line_totals(Money::from_cents(price_cents), 0, taxable, rate);

        prop_assert_eq!(result.total.cents(), 0);
    }

    #[test]
    fn test_empty_aggregate_is_zero(rate_millionths in 0u32..1_000_000u32) {
        let totals = aggregate(&[], TaxRate::from_millionths(rate_millionths));
        prop_assert_eq!(totals, Totals::zero());
    }

    #[test]
    fn test_excluding_removes_contribution(
        items in prop::collection::vec(item_strategy(), 1..20),
        index in any::<prop::sample::Index>(),
        rate_millionths in 0u32..300_000u32
    ) {
        let rate = TaxRate::from_millionths(rate_millionths);
        let mut items = items;
        let i = index.index(items.len());
        items[i].included = true;

        let with_item = aggregate(&items, rate);
        let contribution = line_totals(
            to_cents(&items[i].unit_price),
            items[i].quantity,
            items[i].taxable,
            rate,
        );

        let before = items[i].clone();
        items[i].included = false;
        let without_item = aggregate(&items, rate);

        prop_assert_eq!(with_item.subtotal.cents() - without_item.subtotal.cents(), contribution.line.cents());
        prop_assert_eq!(with_item.tax.cents() - without_item.tax.cents(), contribution.tax.cents());
        prop_assert_eq!(with_item.total.cents() - without_item.total.cents(), contribution.total.cents());

        // Stored quantity and price are untouched
        prop_assert_eq!(items[i].quantity, before.quantity);
        prop_assert_eq!(&items[i].unit_price, &before.unit_price);
    }

    #[test]
    fn test_aggregate_idempotent_and_order_independent(
        items in prop::collection::vec(item_strategy(), 0..20),
        rate_millionths in 0u32..300_000u32
    ) {
        let rate = TaxRate::from_millionths(rate_millionths);
        let first = aggregate(&items, rate);
        let second = aggregate(&items, rate);
        prop_assert_eq!(first, second);

        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(aggregate(&reversed, rate), first);

        prop_assert_eq!(first.total.cents(), first.subtotal.cents() + first.tax.cents());
    }

    #[test]
    fn test_to_cents_text_and_number_agree(dollars in 0u32..100_000u32, cents in 0u32..100u32) {
        let text = format!("{}.{:02}", dollars, cents);
        let number: f64 = text.parse().unwrap();
        let expected = dollars as i64 * 100 + cents as i64;

        prop_assert_eq!(to_cents(&Amount::from(text.as_str())).cents(), expected);
        prop_assert_eq!(to_cents(&Amount::from(number)).cents(), expected);
    }
}

#[test]
fn test_worked_example_19_99() {
    let unit = to_cents(&Amount::from("19.99"));
    let result = line_totals(unit, 3, true, TaxRate::from_percentage(8.75));

    assert_eq!(unit.cents(), 1999);
    assert_eq!(result.line.cents(), 5997);
    assert_eq!(result.tax.cents(), 525);
    assert_eq!(result.total.cents(), 6522);
}

#[test]
fn test_two_items_one_excluded() {
    let items = vec![
        LineItem::new(Money::from_cents(1000), 2, true),
        LineItem::new(Money::from_cents(500), 1, false).excluded(),
    ];
    let totals = aggregate(&items, TaxRate::from_percentage(10.0));

    assert_eq!(totals.subtotal.cents(), 2000);
    assert_eq!(totals.tax.cents(), 200);
    assert_eq!(totals.total.cents(), 2200);
}
