//! # Pricing Session
//!
//! The explicit context object behind an add-on pricing screen. It owns the
//! line items, the tax rate, the proposal header and the export attachments.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PricingSession                                 │
//! │                                                                         │
//! │  UI events ──────► set_quantity / set_included / set_tax_rate           │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                    items: Vec<SessionItem> ──► totals(), rows()         │
//! │                                                                         │
//! │  Upload handler ──► attach_logo / save_signature      (WRITES)          │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                    attachments ──► attachments()       (export READS)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never cached. Every call to [`PricingSession::totals`] runs the
//! calculator over the current items, so there is nothing to invalidate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::{Amount, Money};
use crate::pricing::Calculator;
use crate::proposal::Proposal;
use crate::types::{Addon, LineItem, LineTotals, TaxRate, Totals};
use crate::validation::{normalize_quantity, validate_data_url};

// =============================================================================
// Session Parts
// =============================================================================

/// A catalog add-on together with its current selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    pub addon: Addon,
    pub item: LineItem,
}

/// Proposal header fields entered alongside the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionMeta {
    pub proposal_id: Option<String>,
    pub date: Option<String>,
}

/// Uploaded logo and drawn signature, as `data:` URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Attachments {
    pub logo_data_url: Option<String>,
    pub signature_data_url: Option<String>,
}

/// One table row as the pricing UI shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemRow {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub taxable: bool,
    pub included: bool,
    /// Line totals; all zero when the item is excluded.
    pub totals: LineTotals,
}

// =============================================================================
// Pricing Session
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    items: Vec<SessionItem>,
    tax_rate: TaxRate,
    calculator: Calculator,
    meta: SessionMeta,
    attachments: Attachments,
}

impl PricingSession {
    /// Starts a session with the catalog's default selection.
    pub fn from_catalog(catalog: &Catalog, tax_rate: TaxRate) -> Self {
        let items = catalog
            .iter()
            .map(|addon| SessionItem {
                addon: addon.clone(),
                item: addon.default_line_item(),
            })
            .collect();

        PricingSession {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            items,
            tax_rate,
            calculator: Calculator::default(),
            meta: SessionMeta::default(),
            attachments: Attachments::default(),
        }
    }

    /// Replaces the calculator (rounding policy).
    pub fn with_calculator(mut self, calculator: Calculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    fn item_mut(&mut self, code: &str) -> CoreResult<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|s| s.addon.code == code)
            .map(|s| &mut s.item)
            .ok_or_else(|| CoreError::UnknownAddon(code.to_string()))
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Sets a quantity from raw user input. Returns the normalized value.
    ///
    /// ```rust
    /// use cavefire_core::catalog::Catalog;
    /// use cavefire_core::money::Amount;
    /// use cavefire_core::session::PricingSession;
    /// use cavefire_core::types::TaxRate;
    ///
    /// let catalog = Catalog::from_json(r#"[{"code": "A", "name": "A", "unit_price": 1}]"#).unwrap();
    /// let mut session = PricingSession::from_catalog(&catalog, TaxRate::zero());
    /// assert_eq!(session.set_quantity("A", &Amount::from("2.9")).unwrap(), 2);
    /// assert_eq!(session.set_quantity("A", &Amount::from("-1")).unwrap(), 0);
    /// ```
    pub fn set_quantity(&mut self, code: &str, raw: &Amount) -> CoreResult<u32> {
        let quantity = normalize_quantity(raw);
        self.item_mut(code)?.quantity = quantity;
        Ok(quantity)
    }

    /// Toggles inclusion without touching quantity or price.
    pub fn set_included(&mut self, code: &str, included: bool) -> CoreResult<()> {
        self.item_mut(code)?.included = included;
        Ok(())
    }

    /// Sets the tax rate; `None` (a cleared rate box) means 0%.
    pub fn set_tax_rate(&mut self, rate: Option<TaxRate>) {
        self.tax_rate = rate.unwrap_or_default();
    }

    pub fn set_meta(&mut self, meta: SessionMeta) {
        self.meta = meta;
    }

    /// Stores an uploaded logo. Written by the upload handler only.
    pub fn attach_logo(&mut self, data_url: impl Into<String>) -> CoreResult<()> {
        let data_url = data_url.into();
        validate_data_url("logo_data_url", &data_url)?;
        self.attachments.logo_data_url = Some(data_url);
        Ok(())
    }

    /// Stores a drawn signature.
    pub fn save_signature(&mut self, data_url: impl Into<String>) -> CoreResult<()> {
        let data_url = data_url.into();
        validate_data_url("signature_data_url", &data_url)?;
        self.attachments.signature_data_url = Some(data_url);
        Ok(())
    }

    pub fn clear_signature(&mut self) {
        self.attachments.signature_data_url = None;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Aggregate totals over the included items.
    pub fn totals(&self) -> Totals {
        self.calculator
            .aggregate(self.items.iter().map(|s| &s.item), self.tax_rate)
    }

    /// Every item with its current line totals.
    pub fn rows(&self) -> Vec<ItemRow> {
        self.items
            .iter()
            .map(|s| ItemRow {
                code: s.addon.code.clone(),
                name: s.addon.name.clone(),
                unit: s.addon.unit.clone(),
                unit_price: s.addon.unit_price_cents(),
                quantity: s.item.quantity,
                taxable: s.item.taxable,
                included: s.item.included,
                totals: self.calculator.contribution(&s.item, self.tax_rate),
            })
            .collect()
    }

    /// Rows of included items only, as exported.
    pub fn included_rows(&self) -> Vec<ItemRow> {
        self.rows().into_iter().filter(|r| r.included).collect()
    }

    /// The compose payload for the current selection.
    pub fn to_proposal(&self) -> Proposal {
        Proposal::from_selection(
            self.items
                .iter()
                .filter(|s| s.item.included)
                .map(|s| (s.addon.code.as_str(), s.item.quantity)),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
