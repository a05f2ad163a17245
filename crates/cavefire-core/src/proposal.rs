//! # Proposal Composition
//!
//! A proposal document names add-ons by code, grouped into sections. Composing
//! it resolves each code against the catalog and prices the result with the
//! shared [`Calculator`].
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each section, line_items then add_ons:                             │
//! │                                                                         │
//! │  code in catalog?  ──yes──► catalog price + catalog taxable flag        │
//! │        │                                                                │
//! │        no                                                               │
//! │        ▼                                                                │
//! │  inline unit_price? ──yes──► inline price, inline taxable (else false)  │
//! │        │                                                                │
//! │        no ──► skipped (warned, reported in Composition.skipped)         │
//! │                                                                         │
//! │  quantity: absent → 1, negative / garbage → 0, fractional → floor       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::{to_cents, Amount, Money};
use crate::pricing::Calculator;
use crate::types::{LineTotals, TaxRate, Totals};
use crate::validation::normalize_quantity;

/// Proposal id used by the pricing UI when it asks a server to compose its
/// current selection.
pub const UI_PROPOSAL_ID: &str = "ui-prop";

/// Section title used for the pricing UI's selection.
pub const UI_SECTION_TITLE: &str = "UI Generated";

// =============================================================================
// Proposal Document
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Proposal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProposalMeta>,

    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Header data rendered on exported documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProposalMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_data_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub line_items: Vec<ProposalLine>,

    #[serde(default)]
    pub add_ons: Vec<ProposalLine>,
}

/// A reference to an add-on inside a proposal section.
///
/// Only `code` is required. `unit_price` and `taxable` are consulted only
/// when the code is not in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProposalLine {
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Amount>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Amount>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProposalLine {
    /// A `{code, quantity}` reference, the shape the pricing UI sends.
    pub fn reference(code: impl Into<String>, quantity: u32) -> Self {
        ProposalLine {
            code: code.into(),
            quantity: Some(Amount::Number(quantity as f64)),
            ..Default::default()
        }
    }

    /// Requested quantity: 1 when absent, otherwise normalized.
    pub fn quantity(&self) -> u32 {
        self.quantity.as_ref().map_or(1, normalize_quantity)
    }
}

impl Proposal {
    /// Parses a proposal JSON document.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidProposal(e.to_string()))
    }

    /// Builds the compose payload for a UI selection:
    /// `{id: "ui-prop", sections: [{title: "UI Generated", add_ons: [...]}]}`.
    ///
    /// The caller passes only the selected `(code, quantity)` pairs.
    pub fn from_selection<'a, I>(selection: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let add_ons = selection
            .into_iter()
            .map(|(code, quantity)| ProposalLine::reference(code, quantity))
            .collect();

        Proposal {
            id: Some(UI_PROPOSAL_ID.to_string()),
            sections: vec![Section {
                title: Some(UI_SECTION_TITLE.to_string()),
                line_items: Vec::new(),
                add_ons,
            }],
            ..Default::default()
        }
    }

    /// Title shown on exports: `meta.title`, then `name`, then the id.
    pub fn display_title(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .or(self.name.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("Proposal")
    }
}

// =============================================================================
// Composition
// =============================================================================

/// One resolved and priced proposal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComposedLine {
    /// Index of the section this line came from.
    pub section: usize,
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub taxable: bool,
    pub totals: LineTotals,
}

/// Result of [`compose`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Composition {
    pub lines: Vec<ComposedLine>,
    pub totals: Totals,
    /// Codes that were neither in the catalog nor carried an inline price.
    pub skipped: Vec<String>,
}

impl Composition {
    /// Lines belonging to the given section index.
    pub fn section_lines(&self, section: usize) -> impl Iterator<Item = &ComposedLine> {
        self.lines.iter().filter(move |l| l.section == section)
    }
}

/// Resolves every proposal line against the catalog and prices it.
///
/// ```rust
/// use cavefire_core::catalog::Catalog;
/// use cavefire_core::pricing::Calculator;
/// use cavefire_core::proposal::{compose, Proposal};
/// use cavefire_core::types::TaxRate;
///
/// let catalog = Catalog::from_json(
///     r#"[{"code": "EXT-5LB", "name": "Extinguisher", "unit_price": "15.95", "taxable": true}]"#,
/// ).unwrap();
/// let proposal = Proposal::from_selection([("EXT-5LB", 2)]);
///
/// let result = compose(&proposal, &catalog, &Calculator::default(), TaxRate::from_bps(875));
/// assert_eq!(result.totals.total.cents(), 3469);
/// ```
pub fn compose(
    proposal: &Proposal,
    catalog: &Catalog,
    calculator: &Calculator,
    rate: TaxRate,
) -> Composition {
    let mut composition = Composition::default();

    for (index, section) in proposal.sections.iter().enumerate() {
        for line in section.line_items.iter().chain(section.add_ons.iter()) {
            let Some((description, unit_price, taxable)) = resolve(line, catalog) else {
                warn!(code = %line.code, section = index, "Skipping proposal line without catalog entry or price");
                composition.skipped.push(line.code.clone());
                continue;
            };

            let quantity = line.quantity();
            let totals = calculator.line_totals(unit_price, quantity, taxable, rate);
            composition.totals.add_line(&totals);
            composition.lines.push(ComposedLine {
                section: index,
                code: line.code.clone(),
                description,
                quantity,
                unit_price,
                taxable,
                totals,
            });
        }
    }

    composition
}

fn resolve(line: &ProposalLine, catalog: &Catalog) -> Option<(String, Money, bool)> {
    if let Some(addon) = catalog.find(&line.code) {
        let description = line
            .description
            .clone()
            .unwrap_or_else(|| addon.name.clone());
        return Some((description, addon.unit_price_cents(), addon.taxable));
    }

    let price = line.unit_price.as_ref()?;
    let description = line.description.clone().unwrap_or_else(|| line.code.clone());
    Some((description, to_cents(price), line.taxable.unwrap_or(false)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Rounding;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[
                {"code": "F-A-ANNUAL", "name": "Annual fire alarm inspection",
                 "unit_price": 6.0, "default_quantity": 10, "taxable": false},
                {"code": "EXT-5LB", "name": "5 lb ABC extinguisher",
                 "unit_price": "15.95", "default_quantity": 2, "taxable": true}
            ]"#,
        )
        .unwrap()
    }

    fn rate() -> TaxRate {
        TaxRate::from_bps(875)
    }

    #[test]
    fn test_compose_catalog_lines() {
        let proposal = Proposal::from_json(
            r#"{"id": "P-1", "sections": [
                {"title": "Alarm", "line_items": [{"code": "F-A-ANNUAL", "quantity": 10}]},
                {"title": "Extinguishers", "add_ons": [{"code": "EXT-5LB", "quantity": "2"}]}
            ]}"#,
        )
        .unwrap();

        let result = compose(&proposal, &catalog(), &Calculator::default(), rate());
        assert_eq!(result.lines.len(), 2);
        assert!(result.skipped.is_empty());

        assert_eq!(result.lines[0].totals.total.cents(), 6000);
        assert_eq!(result.lines[1].section, 1);
        assert_eq!(result.lines[1].description, "5 lb ABC extinguisher");
        assert_eq!(result.lines[1].totals.total.cents(), 3469);

        assert_eq!(result.totals.subtotal.cents(), 9190);
        assert_eq!(result.totals.tax.cents(), 279);
        assert_eq!(result.totals.total.cents(), 9469);
    }

    #[test]
    fn test_catalog_price_wins_over_inline() {
        let proposal = Proposal::from_json(
            r#"{"sections": [{"add_ons": [
                {"code": "EXT-5LB", "quantity": 1, "unit_price": "1.00", "taxable": false}
            ]}]}"#,
        )
        .unwrap();

        let result = compose(&proposal, &catalog(), &Calculator::default(), rate());
        assert_eq!(result.lines[0].unit_price.cents(), 1595);
        assert!(result.lines[0].taxable);
    }

    #[test]
    fn test_unknown_code_with_inline_price() {
        let proposal = Proposal::from_json(
            r#"{"sections": [{"line_items": [
                {"code": "CUSTOM", "unit_price": "12.50", "quantity": 2, "description": "Site visit"},
                {"code": "CUSTOM-TAX", "unit_price": 10, "taxable": true}
            ]}]}"#,
        )
        .unwrap();

        let result = compose(&proposal, &catalog(), &Calculator::default(), rate());
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].description, "Site visit");
        assert!(!result.lines[0].taxable);
        assert_eq!(result.lines[0].totals.total.cents(), 2500);

        // Quantity defaults to 1; 8.75% of 10.00 = 0.875 → 0.88
        assert_eq!(result.lines[1].quantity, 1);
        assert_eq!(result.lines[1].totals.tax.cents(), 88);
    }

    #[test]
    fn test_unknown_code_without_price_is_skipped() {
        let proposal = Proposal::from_selection([("NOPE", 3), ("EXT-5LB", 1)]);
        let result = compose(&proposal, &catalog(), &Calculator::default(), rate());

        assert_eq!(result.skipped, vec!["NOPE".to_string()]);
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.totals.subtotal.cents(), 1595);
    }

    #[test]
    fn test_negative_quantity_clamps_to_zero() {
        let proposal = Proposal::from_json(
            r#"{"sections": [{"add_ons": [{"code": "EXT-5LB", "quantity": -4}]}]}"#,
        )
        .unwrap();

        let result = compose(&proposal, &catalog(), &Calculator::default(), rate());
        assert_eq!(result.lines[0].quantity, 0);
        assert!(result.totals.is_zero());
    }

    #[test]
    fn test_empty_proposal() {
        let result = compose(&Proposal::default(), &catalog(), &Calculator::default(), rate());
        assert!(result.lines.is_empty());
        assert!(result.totals.is_zero());
    }

    #[test]
    fn test_selection_payload_shape() {
        let proposal = Proposal::from_selection([("EXT-5LB", 2)]);
        let json = serde_json::to_value(&proposal).unwrap();

        assert_eq!(json["id"], "ui-prop");
        assert_eq!(json["sections"][0]["title"], "UI Generated");
        assert_eq!(json["sections"][0]["line_items"].as_array().unwrap().len(), 0);
        assert_eq!(json["sections"][0]["add_ons"][0]["code"], "EXT-5LB");
        assert_eq!(json["sections"][0]["add_ons"][0]["quantity"], 2.0);
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn test_invalid_proposal_json() {
        assert!(matches!(
            Proposal::from_json("[1, 2]"),
            Err(CoreError::InvalidProposal(_))
        ));
    }

    #[test]
    fn test_display_title_fallbacks() {
        let mut proposal = Proposal {
            id: Some("P-9".to_string()),
            ..Default::default()
        };
        assert_eq!(proposal.display_title(), "P-9");

        proposal.name = Some("Warehouse".to_string());
        assert_eq!(proposal.display_title(), "Warehouse");

        proposal.meta = Some(ProposalMeta {
            title: Some("Warehouse Retrofit".to_string()),
            ..Default::default()
        });
        assert_eq!(proposal.display_title(), "Warehouse Retrofit");
    }

    #[test]
    fn test_compose_honors_calculator_rounding() {
        // 2.00 at 0.25% = 0.5 cents exactly
        let catalog = Catalog::from_json(
            r#"[{"code": "X", "name": "X", "unit_price": "2.00", "taxable": true}]"#,
        )
        .unwrap();
        let proposal = Proposal::from_selection([("X", 1)]);
        let quarter = TaxRate::from_millionths(2_500);

        let away = compose(&proposal, &catalog, &Calculator::default(), quarter);
        let even = compose(&proposal, &catalog, &Calculator::new(Rounding::HalfEven), quarter);
        assert_eq!(away.totals.tax.cents(), 1);
        assert_eq!(even.totals.tax.cents(), 0);
    }
}
